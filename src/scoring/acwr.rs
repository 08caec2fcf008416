// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Acute:chronic workload ratio estimation.
//!
//! The acute load is the current week's training volume; the chronic
//! load is the trailing 4-week average. Zero-history and zero-chronic
//! cases are handled explicitly so a new user or a layoff week never
//! produces an unbounded ratio.

use crate::constants::acwr;
use crate::models::{AcwrInfo, AcwrLabel};

/// Classify a capped ratio into its workload band.
pub fn label_acwr(ratio: Option<f64>) -> AcwrLabel {
    let r = match ratio {
        Some(v) if v.is_finite() => v,
        _ => return AcwrLabel::DataGaps,
    };
    if r < acwr::ALERT_LOW {
        AcwrLabel::Underload
    } else if r <= acwr::AMBER_RATIO {
        AcwrLabel::Stable
    } else if r <= acwr::RED_RATIO {
        AcwrLabel::Caution
    } else {
        AcwrLabel::Spike
    }
}

/// Compute the workload ratio from an acute load and a chronic baseline.
///
/// No chronic history at all reads as a data gap. A zero chronic with a
/// positive acute is a return-from-layoff spike, pinned at the cap.
pub fn compute_acwr(acute: Option<f64>, chronic: Option<f64>) -> AcwrInfo {
    let acute = acute.filter(|v| v.is_finite()).unwrap_or(0.0);
    let chronic = match chronic.filter(|v| v.is_finite()) {
        None => {
            return AcwrInfo {
                ratio: None,
                value: None,
                label: AcwrLabel::DataGaps,
                acute,
                chronic: 0.0,
            }
        }
        Some(c) => c,
    };
    if chronic <= 0.0 {
        if acute <= 0.0 {
            return AcwrInfo {
                ratio: None,
                value: None,
                label: AcwrLabel::DataGaps,
                acute,
                chronic,
            };
        }
        return AcwrInfo {
            ratio: Some(acwr::RATIO_CAP),
            value: Some(acwr::RATIO_CAP),
            label: AcwrLabel::Spike,
            acute,
            chronic,
        };
    }
    let ratio = (acute / chronic).min(acwr::RATIO_CAP);
    let value = (ratio * 10.0).round() / 10.0;
    AcwrInfo {
        ratio: Some(ratio),
        value: Some(value),
        label: label_acwr(Some(ratio)),
        acute,
        chronic,
    }
}
