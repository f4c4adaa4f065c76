//! Series page parsing — string-level HTML extraction.
//!
//! Wikidot pages are pulled apart with plain string scanning plus one
//! regex for the entry line format; no DOM is built.

use regex::Regex;

use scpbot_core::error::{Result, ScpBotError};

use crate::Entry;

/// Highest series number linked anywhere on the page. Series 1 links every
/// other series from its navigation block, so its page doubles as the
/// source of the total count.
pub(crate) fn total_series_count(html: &str) -> Result<u32> {
    let series_re = Regex::new(r"/scp-series-([0-9]+)").expect("valid regex");
    series_re
        .captures_iter(html)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .ok_or_else(|| ScpBotError::Wiki("Failed to parse total series count".into()))
}

/// Parses the entry listing of one series page.
///
/// Each `<li>` in the series content panel is one entry line. The running
/// number starts just below the series' number block and is repaired from
/// the lines themselves: well-formed lines (`SCP-NNNN - Title`) reset it,
/// `[ACCESS DENIED]` lines consume a number without producing an entry,
/// and malformed ("format screw") lines take the next number in sequence.
pub(crate) fn series_entries(html: &str, series: u32) -> Vec<Entry> {
    let entry_re = Regex::new(r"^SCP-[0-9]{3,4} - .*").expect("valid regex");
    let mut last_num: u32 = if series <= 1 { 0 } else { (series - 1) * 1000 - 1 };
    let mut entries = Vec::new();

    for segment in html
        .split(r#"class="content-panel standalone series""#)
        .skip(1)
    {
        // The panel div holds the listing; stop at its closing tag so
        // trailing page chrome cannot leak extra list items in.
        let panel = segment.split("</div>").next().unwrap_or(segment);

        for item in panel.split("<li>").skip(1) {
            let item = item.split("</li>").next().unwrap_or(item);
            let text = decode_entities(&strip_tags(item));
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let parts: Vec<&str> = text.splitn(2, " - ").collect();

            if !entry_re.is_match(text) {
                // format screw entry
                last_num += 1;
                let title = if parts.len() == 2 { parts[1] } else { text };
                entries.push(Entry::new(last_num, title));
                continue;
            }

            if parts[1] == "[ACCESS DENIED]" {
                last_num += 1;
                continue;
            }

            last_num = parts[0][4..].parse().unwrap_or(last_num + 1);
            entries.push(Entry::new(last_num, parts[1]));
        }
    }

    entries
}

/// Drops everything between `<` and `>`.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decodes the HTML entities that actually occur in series listings:
/// the named basics plus numeric references.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest[..rest.len().min(12)].find(';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            "nbsp" => out.push(' '),
            _ => {
                let decoded = entity
                    .strip_prefix('#')
                    .and_then(|n| n.parse::<u32>().ok())
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => out.push(c),
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                        continue;
                    }
                }
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_PAGE: &str = r#"
    <div id="page-content">
      <div class="content-panel standalone series">
        <ul>
          <li><a href="/scp-173">SCP-173</a> - The Sculpture</li>
          <li><a href="/scp-174">SCP-174</a> - [ACCESS DENIED]</li>
          <li><a href="/scp-175">SCP-175</a> - Treasure Map</li>
          <li>   </li>
          <li><a href="/taboo">Taboo</a> - SCP-4000's real name</li>
          <li><a href="/scp-177">SCP-177</a> - Checkmate &amp; Mate</li>
        </ul>
      </div>
    </div>
    <div class="footer"><ul><li>Not - An Entry</li></ul></div>
    "#;

    #[test]
    fn test_parses_well_formed_lines() {
        let entries = series_entries(SERIES_PAGE, 1);
        assert_eq!(entries[0], Entry::new(173, "The Sculpture"));
    }

    #[test]
    fn test_access_denied_consumes_a_number() {
        let entries = series_entries(SERIES_PAGE, 1);
        assert!(!entries.iter().any(|e| e.number == 174));
        assert!(entries.iter().any(|e| e.number == 175));
    }

    #[test]
    fn test_format_screw_takes_next_number() {
        // The taboo line does not match the entry format; it still claims
        // the number after the previous entry.
        let entries = series_entries(SERIES_PAGE, 1);
        let screw = entries.iter().find(|e| e.number == 176).unwrap();
        assert_eq!(screw.title, "SCP-4000's real name");
    }

    #[test]
    fn test_entities_are_decoded() {
        let entries = series_entries(SERIES_PAGE, 1);
        let amp = entries.iter().find(|e| e.number == 177).unwrap();
        assert_eq!(amp.title, "Checkmate & Mate");
    }

    #[test]
    fn test_page_chrome_is_ignored() {
        let entries = series_entries(SERIES_PAGE, 1);
        assert!(!entries.iter().any(|e| e.title.contains("An Entry")));
    }

    #[test]
    fn test_later_series_number_base() {
        let page = r#"
        <div class="content-panel standalone series"><ul>
          <li>Unnumbered - Opening Line</li>
        </ul></div>
        "#;
        let entries = series_entries(page, 3);
        // Series 3 starts counting from 1999; the malformed first line
        // takes 2000.
        assert_eq!(entries[0], Entry::new(2000, "Opening Line"));
    }

    #[test]
    fn test_total_series_count() {
        let page = r#"
        <div class="side-block">
          <div class="menu-item small"><a href="/scp-series-2">II</a></div>
          <div class="menu-item small"><a href="/scp-series-8">VIII</a></div>
          <div class="menu-item small"><a href="/scp-series-3">III</a></div>
        </div>
        "#;
        assert_eq!(total_series_count(page).unwrap(), 8);
    }

    #[test]
    fn test_total_series_count_missing_links() {
        assert!(total_series_count("<html></html>").is_err());
    }

    #[test]
    fn test_strip_tags_and_entities() {
        assert_eq!(strip_tags("<a href=\"x\">hi</a> there"), "hi there");
        assert_eq!(decode_entities("a &amp; b &#8212; c"), "a & b \u{2014} c");
        assert_eq!(decode_entities("dangling & amp"), "dangling & amp");
    }
}
