//! 数值格式化
//!
//! 将金额、数量转换为带量级后缀（T/B/M/K）的展示字符串。
//! 所有函数均为全函数：任意输入都返回字符串，缺失值或 NaN 返回 "N/A"

/// 缺失值占位符
pub const NOT_AVAILABLE: &str = "N/A";

/// 金额格式化：≥1e12 → T，≥1e9 → B，≥1e6 → M，否则带千分位的两位小数
///
/// 量级判断使用绝对值，符号保留在 "$" 之后（如 "$-1.50B"）
pub fn format_currency(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if !v.is_nan() => v,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${}", group_thousands(value))
    }
}

/// 数量格式化：≥1e9 → B，≥1e6 → M，≥1e3 → K，否则带千分位的两位小数
pub fn format_number(value: Option<f64>) -> String {
    let value = match value {
        Some(v) if !v.is_nan() => v,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        group_thousands(value)
    }
}

/// 两位小数并按千分位分组，如 1234567.891 → "1,234,567.89"
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    // inf 等非数字形式原样返回
    if !integer.bytes().all(|b| b.is_ascii_digit()) {
        return formatted;
    }

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
