/// 粗略的token估算，仅用于日志与模型选择的参考
///
/// 英文及符号约4个字符一个token，中文约1.5个字符一个token。
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    ascii_chars_per_token: f64,
    cjk_chars_per_token: f64,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self {
            ascii_chars_per_token: 4.0,
            cjk_chars_per_token: 1.5,
        }
    }
}

impl TokenEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(&self, text: &str) -> usize {
        let (cjk, other) = text.chars().fold((0usize, 0usize), |(cjk, other), c| {
            if is_cjk(c) {
                (cjk + 1, other)
            } else {
                (cjk, other + 1)
            }
        });

        (cjk as f64 / self.cjk_chars_per_token).ceil() as usize
            + (other as f64 / self.ascii_chars_per_token).ceil() as usize
    }

    /// 多段文本的token总数
    pub fn estimate_all<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> usize {
        texts.into_iter().map(|t| self.estimate(t)).sum()
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF |
        0x3400..=0x4DBF |
        0x20000..=0x2A6DF |
        0x2A700..=0x2EBEF |
        0x30000..=0x3134F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(TokenEstimator::new().estimate(""), 0);
    }

    #[test]
    fn test_ascii_and_cjk_rates_differ() {
        let estimator = TokenEstimator::new();
        assert_eq!(estimator.estimate("abcdefgh"), 2);
        assert_eq!(estimator.estimate("数据看板"), 3);
    }

    #[test]
    fn test_estimate_all_sums_parts() {
        let estimator = TokenEstimator::new();
        assert_eq!(estimator.estimate_all(["abcd", "efgh"]), 2);
    }
}
