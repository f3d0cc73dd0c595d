//! Splits release titles into candidate tokens.

const SEPARATORS: &[char] = &[
    '.', '-', '/', ':', '_', '(', ')', ',', '+', '&', '@', '!', '~', '|', '#',
    ';', '（', '）', '，', '～', '「', '」', '《', '》',
];

/// Splits `raw` on separators and whitespace.
///
/// `[...]` and `【...】` groups come back whole, brackets included. An
/// unterminated group is split like ordinary text. Input that yields no
/// pieces at all comes back as one token holding the trimmed input.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '[' | '【' => {
                flush(&mut current, &mut tokens);
                let close = if c == '[' { ']' } else { '】' };
                let mut group = String::from(c);
                let mut closed = false;
                for inner in chars.by_ref() {
                    group.push(inner);
                    if inner == close {
                        closed = true;
                        break;
                    }
                }
                if closed {
                    tokens.push(group);
                } else {
                    tokens.extend(
                        tokenize(&group[c.len_utf8()..])
                            .into_iter()
                            .filter(|t| !t.is_empty()),
                    );
                }
            }
            ']' | '】' => flush(&mut current, &mut tokens),
            c if c.is_whitespace() || SEPARATORS.contains(&c) => {
                flush(&mut current, &mut tokens);
            }
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);

    if tokens.is_empty() {
        tokens.push(raw.trim().to_string());
    }
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// True for `[...]` and `【...】` tokens.
pub fn is_bracketed(token: &str) -> bool {
    (token.starts_with('[') && token.ends_with(']') && token.len() >= 2)
        || (token.starts_with('【') && token.ends_with('】'))
}

/// Contents of a bracketed token without its brackets.
pub fn bracket_inner(token: &str) -> &str {
    token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .or_else(|| {
            token.strip_prefix('【').and_then(|t| t.strip_suffix('】'))
        })
        .unwrap_or(token)
}
