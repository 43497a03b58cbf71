//! Monthly down-sampling for chart-scale output.

use crate::PriceSeries;

/// First point of every distinct `(year, month)`, in order.
///
/// Only for plotting. Peak detection must see the full series.
pub fn sample_monthly(series: &PriceSeries) -> PriceSeries {
    let mut last_key = None;
    let mut sampled = Vec::new();

    for point in series {
        let date = point.date();
        let key = (date.year(), date.month());
        if last_key != Some(key) {
            sampled.push(*point);
            last_key = Some(key);
        }
    }

    PriceSeries::new(sampled)
}
