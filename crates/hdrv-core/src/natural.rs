//! Natural ordering and display-name shortening.

use std::cmp::Ordering;

/// Compares strings so that embedded numbers sort by value:
/// `a2 < a10`, `img007 < img8`.
///
/// Leading zeros are skipped when comparing values; for equal values the
/// run with fewer leading zeros sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut ia, mut ib) = (0, 0);

    while ia < a.len() && ib < b.len() {
        if a[ia].is_ascii_digit() && b[ib].is_ascii_digit() {
            let za = ia + a[ia..].iter().take_while(|&&c| c == b'0').count();
            let zb = ib + b[ib..].iter().take_while(|&&c| c == b'0').count();
            let ea = za + a[za..].iter().take_while(|c| c.is_ascii_digit()).count();
            let eb = zb + b[zb..].iter().take_while(|c| c.is_ascii_digit()).count();

            let ord = (ea - za)
                .cmp(&(eb - zb))
                .then_with(|| a[za..ea].cmp(&b[zb..eb]))
                .then_with(|| (ea - ia).cmp(&(eb - ib)));
            if ord != Ordering::Equal {
                return ord;
            }
            ia = ea;
            ib = eb;
        } else {
            match a[ia].cmp(&b[ib]) {
                Ordering::Equal => {
                    ia += 1;
                    ib += 1;
                }
                ord => return ord,
            }
        }
    }

    (a.len() - ia).cmp(&(b.len() - ib))
}

/// Lengths in bytes of the prefix and suffix shared by all `names`,
/// never splitting a UTF-8 character.
pub fn common_prefix_suffix<S: AsRef<str>>(names: &[S]) -> (usize, usize) {
    let Some(first) = names.first().map(AsRef::as_ref) else {
        return (0, 0);
    };

    let mut prefix = 0;
    for (i, ch) in first.char_indices() {
        let end = i + ch.len_utf8();
        if names.iter().all(|n| n.as_ref().get(i..end) == Some(&first[i..end])) {
            prefix = end;
        } else {
            break;
        }
    }

    let mut suffix = 0;
    for ch in first.chars().rev() {
        let len = suffix + ch.len_utf8();
        let tail = &first[first.len() - len..];
        if names.iter().all(|n| n.as_ref().ends_with(tail)) {
            suffix = len;
        } else {
            break;
        }
    }

    (prefix, suffix)
}

/// Short display names for `names`: the shared prefix and suffix are cut
/// when longer than four bytes, the cut is widened back to whole
/// alphanumeric words, and `...` marks removed text. When all names are
/// identical the file-name component is used.
pub fn short_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let (mut begin, mut end) = common_prefix_suffix(names);
    if begin <= 4 {
        begin = 0;
    }
    if end <= 4 {
        end = 0;
    }

    names
        .iter()
        .map(|n| {
            let long = n.as_ref();
            let bytes = long.as_bytes();
            let mut b = begin.min(long.len());
            let mut e = long.len().saturating_sub(end).max(b);

            if b < long.len() && bytes[b].is_ascii_alphanumeric() {
                while b > 0 && bytes[b - 1].is_ascii_alphanumeric() {
                    b -= 1;
                }
            }
            if e > 0 && bytes[e - 1].is_ascii_alphanumeric() {
                while e < long.len() && bytes[e].is_ascii_alphanumeric() {
                    e += 1;
                }
            }

            if b == e {
                return file_name(long).to_string();
            }
            let mut short = long[b..e].to_string();
            if b != 0 {
                short.insert_str(0, "...");
            }
            if e != long.len() {
                short.push_str("...");
            }
            short
        })
        .collect()
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
