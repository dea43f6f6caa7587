//! Small string lists (muscle groups, equipment, goals, specializations,
//! certifications) are stored in a single text column as `|item|item|`.
//!
//! Items keep their spelling. Inside an item `|` is written as `\p` and `\` as
//! `\\`, so every `|` in the column is a separator and `|item|` matches exactly
//! one whole item. Lookups go through [`contains_item`], which
//! compares case-insensitively.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::ColumnTrait;

const SEPARATOR: char = '|';
const ESCAPE: char = '\\';
/// Stands for an escaped separator.
const ESCAPED_SEPARATOR: char = 'p';
/// Escape character of the generated `LIKE` patterns.
const LIKE_ESCAPE: char = '!';

/// Encode a list for storage. Blank items and case-insensitive duplicates are
/// dropped; the first spelling wins.
pub fn encode<S: AsRef<str>>(items: &[S]) -> String {
    let mut kept: Vec<&str> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.as_ref().trim();
        if !item.is_empty() && !kept.iter().any(|k| k.to_lowercase() == item.to_lowercase()) {
            kept.push(item);
        }
    }
    if kept.is_empty() {
        return String::new();
    }

    let mut encoded = String::from(SEPARATOR);
    for item in kept {
        encoded.push_str(&escape_item(item));
        encoded.push(SEPARATOR);
    }
    encoded
}

pub fn decode(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(ESCAPED_SEPARATOR) => current.push(SEPARATOR),
                Some(escaped) => current.push(escaped),
                None => {}
            },
            SEPARATOR => {
                if !current.is_empty() {
                    items.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}

/// The lowercased substring that matches `item` inside an encoded column.
pub fn needle(item: &str) -> String {
    format!("{SEPARATOR}{}{SEPARATOR}", escape_item(item.trim())).to_lowercase()
}

/// `LOWER(column) LIKE '%|item|%'`: the column holds `item` as a whole entry.
pub fn contains_item<C: ColumnTrait>(column: C, item: &str) -> SimpleExpr {
    contains_text(column, &needle(item))
}

/// Case-insensitive substring match, with `LIKE` wildcards in `text` taken literally.
pub fn contains_text<C: ColumnTrait>(column: C, text: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_item(item: &str) -> String {
    let mut escaped = String::with_capacity(item.len());
    for c in item.chars() {
        match c {
            SEPARATOR => {
                escaped.push(ESCAPE);
                escaped.push(ESCAPED_SEPARATOR);
            }
            ESCAPE => {
                escaped.push(ESCAPE);
                escaped.push(ESCAPE);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_trims_and_deduplicates_ignoring_case() {
        let encoded = encode(&["Chest", " back ", "chest", ""]);
        assert_eq!(encoded, "|Chest|back|");
        assert_eq!(decode(&encoded), vec!["Chest", "back"]);
    }

    #[test]
    fn free_text_keeps_its_spelling() {
        let items = ["NASM-CPT", "CrossFit Level 1", "A|B", r"C:\certs"];
        assert_eq!(decode(&encode(&items)), items);
    }

    #[test]
    fn empty_list_is_empty_string() {
        let items: [&str; 0] = [];
        assert_eq!(encode(&items), "");
        assert!(decode("").is_empty());
    }

    #[test]
    fn needle_matches_whole_items_only() {
        let encoded = encode(&["Legs", "glutes", "A|B"]).to_lowercase();
        assert!(encoded.contains(&needle("legs")));
        assert!(encoded.contains(&needle("a|b")));
        assert!(!encoded.contains(&needle("leg")));
        assert!(!encoded.contains(&needle("a")));
        assert!(!encoded.contains(&needle("b")));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("|pull_up|"), "|pull!_up|");
        assert_eq!(escape_like("100%!"), "100!%!!");
    }
}
