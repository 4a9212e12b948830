//! # 可复用脚本参数
//!
//! `<call: 名称, key=value, ...>` 传入的参数，在后台阅读器中通过 `(@key)` 引用。

use std::collections::BTreeMap;

use crate::error::{ArgError, RuntimeError};
use crate::script::tokens::{PARAMETER_SIGIL, replace_tokens};

/// 可复用脚本的参数表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReusableArgs {
    values: BTreeMap<String, String>,
}

impl ReusableArgs {
    /// 解析 `key=value, key2=value2`
    ///
    /// 空白段被忽略；缺少 `=` 或键为空时返回错误。
    pub fn parse(raw: &str) -> Result<Self, ArgError> {
        let mut values = BTreeMap::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(ArgError::invalid(pair, "参数应为 key=value"));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ArgError::invalid(pair, "参数名不能为空"));
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 替换行中的 `(@key)` 占位符
///
/// 引用了未绑定参数时返回 [`RuntimeError::UnboundParameter`]，这是脚本作者错误。
pub fn substitute_parameters(
    line: &str,
    arguments: Option<&ReusableArgs>,
    script: &str,
) -> Result<String, RuntimeError> {
    let (output, _) = replace_tokens(line, PARAMETER_SIGIL, |key| {
        match arguments.and_then(|args| args.get(key)) {
            Some(value) => Ok(Some(value.to_string())),
            None => Err(RuntimeError::UnboundParameter {
                script: script.to_string(),
                parameter: key.to_string(),
            }),
        }
    })?;
    Ok(output)
}
