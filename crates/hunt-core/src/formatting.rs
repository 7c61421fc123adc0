use chrono::NaiveDate;

/// Format an integer with comma thousands separators, the way the game
/// client prints loot and balance figures.
///
/// # Examples
///
/// ```
/// use hunt_core::formatting::format_grouped;
///
/// assert_eq!(format_grouped(0), "0");
/// assert_eq!(format_grouped(1234567), "1,234,567");
/// assert_eq!(format_grouped(-9876), "-9,876");
/// ```
pub fn format_grouped(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a gold amount, e.g. `"1,250 gp"`.
///
/// # Examples
///
/// ```
/// use hunt_core::formatting::format_gold;
///
/// assert_eq!(format_gold(1250), "1,250 gp");
/// assert_eq!(format_gold(-40), "-40 gp");
/// ```
pub fn format_gold(amount: i64) -> String {
    format!("{} gp", format_grouped(amount))
}

/// Format a signed difference with an explicit `+` for gains.
pub fn format_signed_gold(amount: i64) -> String {
    if amount > 0 {
        format!("+{}", format_gold(amount))
    } else {
        format_gold(amount)
    }
}

/// Render a chart date as `DD-MM-YYYY`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hunt_core::formatting::format_display_date;
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(format_display_date(d), "05-01-2024");
/// ```
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use hunt_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
