use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::dates::parse_timestamp;
use crate::model::{Row, RowField};

use super::view_state::{SortDirection, SortState};

/// Stable in-place sort; rows with equal keys keep their incoming order.
pub(super) fn sort_rows(rows: &mut Vec<&Row>, sort: SortState) {
    let (Some(field), Some(direction)) = (sort.field(), sort.direction()) else {
        return;
    };

    if field == RowField::UpdatedAt {
        sort_by_timestamp(rows, direction);
        return;
    }

    rows.sort_by(|left, right| {
        let ordering = locale_compare(left.get(field), right.get(field));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

// Unparseable dates have no instant; they sit after every dated row in both
// directions and keep their incoming order among themselves.
fn sort_by_timestamp(rows: &mut Vec<&Row>, direction: SortDirection) {
    let mut keyed = rows
        .iter()
        .map(|row| (parse_timestamp(&row.updated_at), *row))
        .collect::<Vec<(Option<i64>, &Row)>>();

    keyed.sort_by(|(left, _), (right, _)| match (left, right) {
        (Some(left), Some(right)) => match direction {
            SortDirection::Ascending => left.cmp(right),
            SortDirection::Descending => right.cmp(left),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    *rows = keyed.into_iter().map(|(_, row)| row).collect();
}

/// Root-locale style ordering. Strings are compared on their base letters
/// first (case and accents ignored; whitespace, then punctuation and symbols,
/// then digits, then letters), then on accents with unaccented first, then on
/// case with lowercase first. Byte order settles anything left.
pub fn locale_compare(left: &str, right: &str) -> Ordering {
    primary_keys(left)
        .cmp(primary_keys(right))
        .then_with(|| accent_keys(left).cmp(&accent_keys(right)))
        .then_with(|| case_keys(left).cmp(case_keys(right)))
        .then_with(|| left.cmp(right))
}

fn primary_keys(value: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .map(primary_key)
}

fn primary_key(ch: char) -> (u8, char) {
    let class = if ch.is_whitespace() {
        0
    } else if ch.is_numeric() {
        2
    } else if ch.is_alphabetic() {
        3
    } else {
        1
    };
    (class, ch)
}

// Marks attached to each base character, in order.
fn accent_keys(value: &str) -> Vec<Vec<char>> {
    let mut keys: Vec<Vec<char>> = Vec::new();
    for ch in value.nfd() {
        if is_combining_mark(ch)
            && let Some(marks) = keys.last_mut()
        {
            marks.push(ch);
        } else {
            keys.push(Vec::new());
        }
    }
    keys
}

fn case_keys(value: &str) -> impl Iterator<Item = bool> + '_ {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .map(char::is_uppercase)
}
