//! Utilidades de ordenación y particionado.

use std::cmp::Ordering;

/// Token de ordenación natural: los runs de dígitos se comparan como número,
/// el resto como texto en minúsculas.
#[derive(Debug, PartialEq, Eq)]
enum NatToken {
    Num(u64),
    Text(String),
}

fn nat_tokens(s: &str) -> Vec<NatToken> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_digits = false;
    for c in s.chars() {
        let d = c.is_ascii_digit();
        if !buf.is_empty() && d != in_digits {
            out.push(flush(&mut buf, in_digits));
        }
        in_digits = d;
        buf.push(c);
    }
    if !buf.is_empty() {
        out.push(flush(&mut buf, in_digits));
    }
    out
}

fn flush(buf: &mut String, digits: bool) -> NatToken {
    let s = std::mem::take(buf);
    if digits {
        // Runs absurdamente largos de dígitos caen a comparación textual.
        match s.parse::<u64>() {
            Ok(n) => NatToken::Num(n),
            Err(_) => NatToken::Text(s),
        }
    } else {
        NatToken::Text(s.to_lowercase())
    }
}

fn nat_cmp_tokens(a: &NatToken, b: &NatToken) -> Ordering {
    match (a, b) {
        (NatToken::Num(x), NatToken::Num(y)) => x.cmp(y),
        (NatToken::Text(x), NatToken::Text(y)) => x.cmp(y),
        // Un número ordena antes que texto en la misma posición.
        (NatToken::Num(_), NatToken::Text(_)) => Ordering::Less,
        (NatToken::Text(_), NatToken::Num(_)) => Ordering::Greater,
    }
}

/// Comparación natural de dos strings ("sample2" < "sample10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ta = nat_tokens(a);
    let tb = nat_tokens(b);
    for (x, y) in ta.iter().zip(tb.iter()) {
        match nat_cmp_tokens(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    ta.len().cmp(&tb.len()).then_with(|| a.cmp(b))
}

/// Ordena un vector de strings en orden natural, in place.
pub fn natural_sort(items: &mut [String]) {
    items.sort_by(|a, b| natural_cmp(a, b));
}

/// Trocea `items` en chunks consecutivos de tamaño máximo `n`. El último
/// chunk puede ser más corto; nunca se produce un chunk vacío.
pub fn chunks<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    assert!(n > 0, "chunk size must be positive");
    items.chunks(n).map(|c| c.to_vec()).collect()
}
