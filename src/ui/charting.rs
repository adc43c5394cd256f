/// Compute X (session number) and Y (value) upper bounds for a history chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let mut highest = 0.0;
    for &(_, value) in points {
        if value > highest {
            highest = value;
        }
    }

    let mut sessions = match points.last() {
        Some(p) => p.0,
        None => 1.0,
    };
    if sessions < 2.0 {
        sessions = 2.0;
    }

    let top = if highest > 0.0 { (highest * 1.1).ceil() } else { 1.0 };
    (sessions, top)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
