use chrono::{DateTime, FixedOffset, Utc};

// Время создания заявки в виде `ЧЧ:ММ ДД.ММ.ГГГГ`
pub fn format_timestamp(timestamp: &DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp
        .with_timezone(&offset)
        .format("%H:%M %d.%m.%Y")
        .to_string()
}

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_is_zero_padded_in_display_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 4, 5, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let almaty = FixedOffset::east_opt(5 * 3600).unwrap();
        assert_eq!(format_timestamp(&ts, utc), "04:05 01.03.2024");
        assert_eq!(format_timestamp(&ts, almaty), "09:05 01.03.2024");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}
