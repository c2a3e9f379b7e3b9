//! Natural ordering of names, so that "Team 9" sorts before "Team 10".

use std::{cmp::Ordering, iter::Peekable, str::Chars};

/// Compares two strings case-insensitively, treating runs of digits as
/// numbers.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        let (x, y) = match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => (x, y),
        };

        if x.is_ascii_digit() && y.is_ascii_digit() {
            let x = digits(&mut a);
            let y = digits(&mut b);
            let tx = x.trim_start_matches('0');
            let ty = y.trim_start_matches('0');
            let ord = tx
                .len()
                .cmp(&ty.len())
                .then_with(|| tx.cmp(ty))
                .then_with(|| x.len().cmp(&y.len()));
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }

        let ord = x.to_lowercase().cmp(y.to_lowercase());
        if ord != Ordering::Equal {
            return ord;
        }
        a.next();
        b.next();
    }
}

fn digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}
