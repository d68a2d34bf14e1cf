//! 値オブジェクト定義用のマクロ
//!
//! - [`define_id!`]: UUID v7 の識別子
//! - [`define_text!`]: 前後の空白を除去し、必須・最大文字数を検証する文字列

use crate::DomainError;

/// 必須・最大文字数（Unicode スカラー値で数える）を検査する
///
/// 空かどうかは前後の空白を除いて判定する。`keep_whitespace` が `false` なら
/// 前後の空白を除いた値を、`true` なら入力そのままを保持・計数する。
pub(crate) fn normalize_text(
    raw: String,
    label: &str,
    max_chars: usize,
    keep_whitespace: bool,
) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{label}は必須です")));
    }

    let value = if keep_whitespace {
        raw
    } else {
        trimmed.to_owned()
    };
    if value.chars().count() > max_chars {
        return Err(DomainError::Validation(format!(
            "{label}は {max_chars} 文字以内で入力してください"
        )));
    }
    Ok(value)
}

/// UUID v7 の識別子型を定義する
///
/// 時刻順に並ぶため、主キーとして挿入順とほぼ一致する。
///
/// ```rust
/// use aveniq_domain::contact::ContactMessageId;
///
/// let id = ContactMessageId::new();
/// assert_eq!(ContactMessageId::from_uuid(*id.as_uuid()), id);
/// assert_eq!(id.to_string(), id.as_uuid().to_string());
/// ```
macro_rules! define_id {
    (
        $(#[$attr:meta])*
        $vis:vis struct $Id:ident;
    ) => {
        $(#[$attr])*
        #[derive(
            Clone, Copy, Debug, Eq, Hash, PartialEq,
            serde::Deserialize, serde::Serialize,
            derive_more::Display, derive_more::From,
        )]
        #[serde(transparent)]
        $vis struct $Id(uuid::Uuid);

        impl $Id {
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            pub fn from_uuid(value: uuid::Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $Id {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// 検証済みテキストの Newtype を定義する
///
/// `redacted` を付けると `Debug` は中身を出さず、`Display` も実装しない。
/// 氏名や本文などの個人情報がログへ平文で出ることを防ぐ。
///
/// `verbatim` を付けると前後の空白を除かずに保持する（空白のみの入力は拒否する）。
/// `Deserialize` は実装しない。生成は必ず `new` を通す。
///
/// ```rust
/// use aveniq_domain::contact::{ContactName, MessageBody, Subject};
///
/// let name = ContactName::new("  Ana  ").unwrap();
/// assert_eq!(name.as_str(), "Ana");
/// assert_eq!(format!("{name:?}"), "ContactName(\"[REDACTED]\")");
///
/// let subject = Subject::new("Hi").unwrap();
/// assert_eq!(subject.to_string(), "Hi");
/// assert!(Subject::new(" ").is_err());
///
/// let body = MessageBody::new("  indented\n").unwrap();
/// assert_eq!(body.as_str(), "  indented\n");
/// ```
///
/// JSON から直接復元はできない。
///
/// ```compile_fail
/// use aveniq_domain::contact::Subject;
///
/// let _: Subject = serde_json::from_str("\"\"").unwrap();
/// ```
macro_rules! define_text {
    (@fmt $Name:ident redacted) => {
        impl std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($Name)).field(&"[REDACTED]").finish()
            }
        }
    };
    (@fmt $Name:ident) => {
        impl std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($Name)).field(&self.0).finish()
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
    (@define
        { $(#[$attr:meta])* $vis:vis struct $Name:ident }
        $label:literal, $max:literal, $keep:literal $(, $redacted:ident)?
    ) => {
        $(#[$attr])*
        #[derive(Clone, Eq, PartialEq, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            /// エラーメッセージに使う項目名
            pub const LABEL: &'static str = $label;
            /// 許容する最大文字数
            pub const MAX_CHARS: usize = $max;

            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                $crate::macros::normalize_text(value.into(), Self::LABEL, Self::MAX_CHARS, $keep)
                    .map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        define_text!(@fmt $Name $($redacted)?);
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $Name:ident: $label:literal, max $max:literal, verbatim $(, $redacted:ident)?;
    ) => {
        define_text!(@define { $(#[$attr])* $vis struct $Name } $label, $max, true $(, $redacted)?);
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $Name:ident: $label:literal, max $max:literal $(, $redacted:ident)?;
    ) => {
        define_text!(@define { $(#[$attr])* $vis struct $Name } $label, $max, false $(, $redacted)?);
    };
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", "件名は必須です")]
    #[case(" \t\n", "件名は必須です")]
    #[case("abcdef", "件名は 5 文字以内で入力してください")]
    fn test_空や上限超過は検証エラーになる(#[case] raw: &str, #[case] expected: &str) {
        let err = normalize_text(raw.to_string(), "件名", 5, false).unwrap_err();

        assert_eq!(err, DomainError::Validation(expected.to_string()));
    }

    #[test]
    fn test_文字数はバイト数ではなく文字単位で数える() {
        assert_eq!(
            normalize_text("お問い合わせ".to_string(), "件名", 6, false),
            Ok("お問い合わせ".to_string())
        );
    }

    #[test]
    fn test_前後の空白は除去し内側の空白は保持する() {
        assert_eq!(
            normalize_text("  Hello  world \n".to_string(), "件名", 100, false),
            Ok("Hello  world".to_string())
        );
    }

    #[test]
    fn test_空白を保持する場合は入力をそのまま返す() {
        assert_eq!(
            normalize_text("  - 手順 1\n  - 手順 2\n\n".to_string(), "本文", 100, true),
            Ok("  - 手順 1\n  - 手順 2\n\n".to_string())
        );
    }

    #[test]
    fn test_空白を保持する場合も空白のみの入力は必須エラーになる() {
        assert_eq!(
            normalize_text(" \n\t".to_string(), "本文", 100, true),
            Err(DomainError::Validation("本文は必須です".to_string()))
        );
    }
}
