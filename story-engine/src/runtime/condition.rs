//! # Condition 模块
//!
//! `case` / `or_case` / `case_else` / `case_end` 条件块。
//!
//! ## 条件栈
//!
//! 每个阅读器持有一个条件栈，每个 `case` 压入一帧，`case_end` 弹出：
//!
//! ```text
//! Passing         条件成立，块内的行正常执行
//! Skipping(name)  条件不成立，块内的行被丢弃，直到 or_case(name) / case_else / case_end
//! Inert           外层块正在跳过，整个内层块都被丢弃
//! ```

use rand::Rng;
use rand::distributions::Alphanumeric;
use std::str::FromStr;
use tracing::warn;

use crate::error::ArgError;

/// `case_else` 翻转后使用的条件名
pub const ELSE_CONDITION_NAME: &str = "!else-condition!";

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Is,
    IsNot,
    MoreThan,
    SameOrMoreThan,
    LessThan,
    SameOrLessThan,
    Between,
    NotBetween,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
}

impl FromStr for ConditionOperator {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_lowercase();
        let op = match keyword.as_str() {
            "is" => Self::Is,
            "is not" => Self::IsNot,
            "more than" => Self::MoreThan,
            "same or more than" => Self::SameOrMoreThan,
            "less than" => Self::LessThan,
            "same or less than" => Self::SameOrLessThan,
            "between" => Self::Between,
            "not between" => Self::NotBetween,
            "contains" => Self::Contains,
            "does not contain" => Self::DoesNotContain,
            "starts with" => Self::StartsWith,
            "ends with" => Self::EndsWith,
            "is empty" => Self::IsEmpty,
            "is not empty" => Self::IsNotEmpty,
            _ => return Err(ArgError::invalid(s, "未知的比较运算符")),
        };
        Ok(op)
    }
}

/// 解析数值，失败时返回 None
fn number(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

/// 解析 `"低 and 高"` 形式的区间
fn range(value: &str) -> Result<(f64, f64), ArgError> {
    let lower = value.to_lowercase();
    let Some(pos) = lower.find(" and ") else {
        return Err(ArgError::invalid(value, "区间格式应为 '低 and 高'"));
    };
    let low = number(&value[..pos]);
    let high = number(&value[pos + " and ".len()..]);
    match (low, high) {
        (Some(low), Some(high)) => Ok((low, high)),
        _ => Err(ArgError::invalid(value, "区间边界必须是数值")),
    }
}

/// 计算条件
///
/// 数值比较在任意一侧不是数值时为 false。区间格式错误返回错误。
pub fn evaluate(value1: &str, operator: ConditionOperator, value2: &str) -> Result<bool, ArgError> {
    use ConditionOperator::*;

    let numeric = |cmp: fn(f64, f64) -> bool| match (number(value1), number(value2)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    };

    let result = match operator {
        Is => value1 == value2,
        IsNot => value1 != value2,
        MoreThan => numeric(|a, b| a > b),
        SameOrMoreThan => numeric(|a, b| a >= b),
        LessThan => numeric(|a, b| a < b),
        SameOrLessThan => numeric(|a, b| a <= b),
        Between | NotBetween => {
            let (low, high) = range(value2)?;
            let inside = number(value1).is_some_and(|v| low <= v && v <= high);
            if operator == Between { inside } else { !inside }
        }
        Contains => value1.contains(value2),
        DoesNotContain => !value1.contains(value2),
        StartsWith => value1.starts_with(value2),
        EndsWith => value1.ends_with(value2),
        IsEmpty => value1.is_empty(),
        IsNotEmpty => !value1.is_empty(),
    };
    Ok(result)
}

/// 解析运算符并计算，任何错误都视为条件不成立
pub fn evaluate_text(value1: &str, operator: &str, value2: &str) -> bool {
    let result = operator
        .parse::<ConditionOperator>()
        .and_then(|op| evaluate(value1, op, value2));
    match result {
        Ok(result) => result,
        Err(e) => {
            warn!(value1, operator, value2, error = %e, "条件无法计算，视为不成立");
            false
        }
    }
}

/// 生成 12 位随机条件名
pub fn random_condition_name() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// 条件栈中的一帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionFrame {
    Passing,
    Skipping(String),
    Inert,
}

/// 阅读器的条件栈
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionStack {
    frames: Vec<ConditionFrame>,
}

impl ConditionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前是否处于跳过模式
    pub fn is_skipping(&self) -> bool {
        matches!(
            self.frames.last(),
            Some(ConditionFrame::Skipping(_) | ConditionFrame::Inert)
        )
    }

    /// 当前正在跳过的条件名
    pub fn skipping_name(&self) -> Option<&str> {
        match self.frames.last() {
            Some(ConditionFrame::Skipping(name)) => Some(name),
            _ => None,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// 进入跳过区域内的嵌套块
    pub fn enter_inert(&mut self) {
        self.frames.push(ConditionFrame::Inert);
    }

    /// `case`
    pub fn open(&mut self, passed: bool, name: String) {
        let frame = if passed {
            ConditionFrame::Passing
        } else {
            ConditionFrame::Skipping(name)
        };
        self.frames.push(frame);
    }

    /// `or_case`：只在跳过同名条件时重新计算
    ///
    /// `evaluate` 只在需要时调用。
    pub fn or_case(&mut self, name: &str, evaluate: impl FnOnce() -> bool) {
        if self.skipping_name() != Some(name) {
            return;
        }
        if evaluate()
            && let Some(top) = self.frames.last_mut()
        {
            *top = ConditionFrame::Passing;
        }
    }

    /// `case_else`
    pub fn case_else(&mut self) {
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        *top = match top {
            ConditionFrame::Passing => ConditionFrame::Skipping(ELSE_CONDITION_NAME.to_string()),
            ConditionFrame::Skipping(_) => ConditionFrame::Passing,
            ConditionFrame::Inert => ConditionFrame::Inert,
        };
    }

    /// `case_end`
    pub fn close(&mut self) {
        self.frames.pop();
    }
}
