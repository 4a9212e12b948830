//! # 占位符替换
//!
//! 脚本中的两种占位符：
//!
//! - `($name)`：变量，括号内允许空格
//! - `(@name)`：可复用脚本参数
//!
//! 两者共用同一个扫描器，只是前缀字符不同。

/// 变量占位符前缀
pub const VARIABLE_SIGIL: char = '$';
/// 可复用脚本参数占位符前缀
pub const PARAMETER_SIGIL: char = '@';

/// 扫描 `line` 中的 `(<sigil>name)` 占位符并替换
///
/// `resolve` 返回 `Ok(None)` 时保留原文不变。返回替换后的文本以及是否发生过替换。
pub fn replace_tokens<E>(
    line: &str,
    sigil: char,
    mut resolve: impl FnMut(&str) -> Result<Option<String>, E>,
) -> Result<(String, bool), E> {
    let mut output = String::with_capacity(line.len());
    let mut replaced = false;
    let mut rest = line;

    while let Some(open) = rest.find('(') {
        output.push_str(&rest[..open]);
        let candidate = &rest[open..];

        match token_at(candidate, sigil) {
            Some((name, len)) => match resolve(name)? {
                Some(value) => {
                    output.push_str(&value);
                    replaced = true;
                    rest = &candidate[len..];
                }
                None => {
                    output.push_str(&candidate[..len]);
                    rest = &candidate[len..];
                }
            },
            None => {
                output.push('(');
                rest = &candidate[1..];
            }
        }
    }
    output.push_str(rest);

    Ok((output, replaced))
}

/// 解析以 `(` 开头的占位符，返回名称和占位符的字节长度
fn token_at(text: &str, sigil: char) -> Option<(&str, usize)> {
    let inner = text.strip_prefix('(')?;
    let after_space = inner.trim_start_matches(' ');
    let body = after_space.strip_prefix(sigil)?;
    let close = body.find(')')?;
    let name = body[..close].trim();

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c == '_' || c == ' ' || c.is_alphanumeric());
    if !valid {
        return None;
    }

    let consumed = text.len() - body.len() + close + 1;
    Some((name, consumed))
}

/// 行中是否包含指定前缀的占位符
pub fn contains_token(line: &str, sigil: char) -> bool {
    line.match_indices('(')
        .any(|(pos, _)| token_at(&line[pos..], sigil).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Result<Option<String>, ()> {
        Ok(match name {
            "name" => Some("Rave".to_string()),
            "mood" => Some("happy".to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_replace_variables() {
        let (out, replaced) =
            replace_tokens("Hi ($name), you look ( $mood ).", VARIABLE_SIGIL, lookup).unwrap();
        assert_eq!(out, "Hi Rave, you look happy.");
        assert!(replaced);
    }

    #[test]
    fn test_unknown_token_left_as_is() {
        let (out, replaced) = replace_tokens("($unknown) (plain)", VARIABLE_SIGIL, lookup).unwrap();
        assert_eq!(out, "($unknown) (plain)");
        assert!(!replaced);
    }

    #[test]
    fn test_sigils_do_not_mix() {
        let (out, _) = replace_tokens("(@name) ($name)", VARIABLE_SIGIL, lookup).unwrap();
        assert_eq!(out, "(@name) Rave");

        let (out, _) = replace_tokens("(@name) ($name)", PARAMETER_SIGIL, lookup).unwrap();
        assert_eq!(out, "Rave ($name)");
    }

    #[test]
    fn test_resolver_error_propagates() {
        let result = replace_tokens("(@who)", PARAMETER_SIGIL, |name| {
            Err::<Option<String>, _>(name.to_string())
        });
        assert_eq!(result.unwrap_err(), "who");
    }

    #[test]
    fn test_contains_token() {
        assert!(contains_token("<character_show: (@who)>", PARAMETER_SIGIL));
        assert!(!contains_token("<character_show: (who)>", PARAMETER_SIGIL));
        assert!(!contains_token("", VARIABLE_SIGIL));
    }
}
