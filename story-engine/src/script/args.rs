//! # 参数解码
//!
//! 把指令的原始参数字符串解码为带类型的记录。
//!
//! 记录由 N 个有类型的字段组成（文本、整数、浮点数）。原始参数必须恰好拆成
//! N 段（逗号分隔，去除首尾空白），任意数值字段转换失败都会让整个解码失败。
//!
//! 如果记录的最后一个字段是 [`FreeText`]，则最多拆成 N 段，最后一段可以包含
//! 逗号；其他记录保持严格的段数检查。

use crate::error::ArgError;

/// 可以从单个参数段解码的字段类型
pub trait ArgField: Sized {
    /// 是否吞掉剩余的全部文本（只能是最后一个字段）
    const TRAILING: bool = false;

    /// 从已去除空白的参数段解码
    fn parse_field(index: usize, raw: &str) -> Result<Self, ArgError>;
}

/// 可以从参数字符串解码的记录
pub trait FromArgs: Sized {
    /// 字段数量
    const ARITY: usize;
    /// 最后一个字段是否为自由文本
    const TRAILING: bool;

    /// 从拆分好的参数段构建记录
    fn from_fields(fields: &[&str]) -> Result<Self, ArgError>;
}

/// 自由文本字段，可以包含逗号
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FreeText(pub String);

impl FreeText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ArgField for FreeText {
    const TRAILING: bool = true;

    fn parse_field(_index: usize, raw: &str) -> Result<Self, ArgError> {
        Ok(Self(raw.to_string()))
    }
}

impl ArgField for String {
    fn parse_field(_index: usize, raw: &str) -> Result<Self, ArgError> {
        Ok(raw.to_string())
    }
}

macro_rules! numeric_field {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl ArgField for $ty {
                fn parse_field(index: usize, raw: &str) -> Result<Self, ArgError> {
                    raw.parse().map_err(|_| ArgError::NotNumeric {
                        index,
                        value: raw.to_string(),
                        expected: $kind,
                    })
                }
            }
        )+
    };
}

numeric_field! {
    i32 => "整数",
    u32 => "非负整数",
    f32 => "数值",
}

/// 按记录的字段数拆分参数字符串
pub fn split_fields(raw: &str, arity: usize, trailing: bool) -> Result<Vec<&str>, ArgError> {
    let fields: Vec<&str> = if trailing {
        raw.splitn(arity, ',').map(str::trim).collect()
    } else {
        raw.split(',').map(str::trim).collect()
    };

    if fields.len() != arity {
        return Err(ArgError::Arity {
            expected: arity,
            actual: fields.len(),
        });
    }
    Ok(fields)
}

/// 将原始参数解码为记录
pub fn decode<T: FromArgs>(raw: Option<&str>) -> Result<T, ArgError> {
    let raw = raw.ok_or(ArgError::Missing)?;
    let fields = split_fields(raw, T::ARITY, T::TRAILING)?;
    T::from_fields(&fields)
}

/// 定义参数记录
///
/// ```ignore
/// arg_record! {
///     /// 精灵名与别名
///     pub struct LoadSprite { name: String, alias: String }
/// }
/// ```
macro_rules! arg_record {
    ($(
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $field:ident : $ty:ty),+ $(,)?
        }
    )+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $($(#[$fmeta])* pub $field: $ty),+
        }

        impl $crate::script::args::FromArgs for $name {
            const ARITY: usize = [$(stringify!($field)),+].len();
            const TRAILING: bool = {
                let trailing = [$(<$ty as $crate::script::args::ArgField>::TRAILING),+];
                trailing[trailing.len() - 1]
            };

            fn from_fields(fields: &[&str]) -> Result<Self, $crate::error::ArgError> {
                let mut fields = fields.iter().copied().enumerate();
                Ok(Self {
                    $($field: {
                        let (index, raw) = fields.next().ok_or($crate::error::ArgError::Missing)?;
                        <$ty as $crate::script::args::ArgField>::parse_field(index + 1, raw)?
                    }),+
                })
            }
        }
    )+};
}

pub(crate) use arg_record;
