//! 走法编码
//!
//! 两种表示形式并存，需要互相转换：
//! - [`MoveCode`]: 传输边界使用的紧凑编码（4-5 字符，如 `e2e4`, `e7e8q`）
//! - [`VerboseMove`]: 内部使用的结构化形式（起点、终点、升变、SAN 记号）

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// 紧凑走法编码
///
/// 格式：起点 + 终点（各 2 字符，列 a-h + 行 1-8），
/// 可选跟一个升变棋子字符（q/r/b/n）。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveCode(String);

impl MoveCode {
    /// 解析并校验走法编码
    pub fn parse(input: &str) -> Result<Self, ChessError> {
        let invalid = || ChessError::InvalidMoveCode {
            input: input.to_string(),
        };

        let code = input.trim().to_ascii_lowercase();
        if code.len() != 4 && code.len() != 5 {
            return Err(invalid());
        }

        let bytes = code.as_bytes();
        let square_ok = |file: u8, rank: u8| (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank);
        if !square_ok(bytes[0], bytes[1]) || !square_ok(bytes[2], bytes[3]) {
            return Err(invalid());
        }

        if let Some(&promo) = bytes.get(4) {
            if !matches!(promo, b'q' | b'r' | b'b' | b'n') {
                return Err(invalid());
            }
        }

        Ok(Self(code))
    }

    /// 起点格（如 "e2"）
    pub fn from_square(&self) -> &str {
        &self.0[..2]
    }

    /// 终点格（如 "e4"）
    pub fn to_square(&self) -> &str {
        &self.0[2..4]
    }

    /// 升变棋子（如果有）
    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for MoveCode {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for MoveCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 结构化走法
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerboseMove {
    /// 起点格
    pub from: String,
    /// 终点格
    pub to: String,
    /// 升变棋子（如果有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
    /// 应用于对应局面时的 SAN 记号
    pub san: String,
}

impl VerboseMove {
    /// 转换为紧凑编码
    pub fn code(&self) -> MoveCode {
        let mut code = format!("{}{}", self.from, self.to);
        if let Some(p) = self.promotion {
            code.push(p);
        }
        MoveCode(code)
    }
}

impl std::fmt::Display for VerboseMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} -> {})", self.san, self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_move() {
        let code = MoveCode::parse("e2e4").unwrap();
        assert_eq!(code.from_square(), "e2");
        assert_eq!(code.to_square(), "e4");
        assert_eq!(code.promotion(), None);
    }

    #[test]
    fn test_parse_promotion_move() {
        let code = MoveCode::parse("e7e8q").unwrap();
        assert_eq!(code.from_square(), "e7");
        assert_eq!(code.to_square(), "e8");
        assert_eq!(code.promotion(), Some('q'));
    }

    #[test]
    fn test_parse_normalizes_case() {
        let code = MoveCode::parse("E2E4").unwrap();
        assert_eq!(code.as_str(), "e2e4");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        // 长度不对
        assert!(MoveCode::parse("e2").is_err());
        assert!(MoveCode::parse("e2e4qq").is_err());

        // 越界的格子
        assert!(MoveCode::parse("i2e4").is_err());
        assert!(MoveCode::parse("e9e4").is_err());
        assert!(MoveCode::parse("e2e0").is_err());

        // 无效的升变棋子
        assert!(MoveCode::parse("e7e8k").is_err());
        assert!(MoveCode::parse("e7e8p").is_err());
    }

    #[test]
    fn test_verbose_move_roundtrip() {
        let mv = VerboseMove {
            from: "a7".to_string(),
            to: "a8".to_string(),
            promotion: Some('q'),
            san: "a8=Q".to_string(),
        };
        assert_eq!(mv.code().as_str(), "a7a8q");
    }

    #[test]
    fn test_serde_transparent() {
        let code = MoveCode::parse("g1f3").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"g1f3\"");
    }
}
