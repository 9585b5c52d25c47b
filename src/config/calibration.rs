// ==========================================
// 钢轨打磨排程系统 - 标定数据（版本化）
// ==========================================
// 职责: 标准单元编码分类规则 + 年增长频率表
// 红线: 标定数据属于外部版本化配置，不硬编码进估算/排程逻辑
// 存储: JSON（整体）或 CSV（频率表: element_code,frequency）
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// 标准单元编码长度
pub const ELEMENT_CODE_LEN: usize = 8;

// ==========================================
// MatchPattern - 类别匹配方式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPattern {
    Exact(String),
    Prefix(String),
    Contains(String),
}

impl MatchPattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            MatchPattern::Exact(p) => value == p,
            MatchPattern::Prefix(p) => value.starts_with(p.as_str()),
            MatchPattern::Contains(p) => value.contains(p.as_str()),
        }
    }
}

// ==========================================
// CategoryRule - 类别 → 编码位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: MatchPattern,
    pub code: char,
}

impl CategoryRule {
    fn new(pattern: MatchPattern, code: char) -> Self {
        Self { pattern, code }
    }
}

/// 按规则顺序匹配，命中即返回
fn match_rules(rules: &[CategoryRule], value: &str) -> Option<char> {
    rules
        .iter()
        .find(|rule| rule.pattern.matches(value))
        .map(|rule| rule.code)
}

// ==========================================
// RadiusBucket - 半径分档
// ==========================================
// radius > above 即落入该档；档位按 above 降序排列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusBucket {
    pub above: f64,
    pub code: char,
}

// ==========================================
// ClassificationRules - 标准单元编码规则
// ==========================================
// 编码 = prefix + 半径位 + 轨枕位 + 轨型位 + 钢种位 + suffix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRules {
    pub code_prefix: String,
    pub code_suffix: String,

    // ===== 半径 =====
    pub radius_buckets: Vec<RadiusBucket>,
    pub radius_fallback_code: char, // 不大于最小档位
    pub radius_sentinel: char,      // 半径缺失

    // ===== 轨枕 =====
    pub tie_rules: Vec<CategoryRule>,
    pub tie_sentinel: char,

    // ===== 轨型 =====
    pub rail_rules: Vec<CategoryRule>,
    pub rail_sentinel: char,

    // ===== 钢种 =====
    pub steel_rules: Vec<CategoryRule>,
    pub steel_other_code: char,   // 有值但不在规则内
    pub steel_sentinel: char,     // 缺失
}

/// 分类结果：编码位 + 是否命中已知类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeDigit {
    pub code: char,
    pub recognised: bool,
}

impl CodeDigit {
    fn known(code: char) -> Self {
        Self { code, recognised: true }
    }

    fn unknown(code: char) -> Self {
        Self { code, recognised: false }
    }
}

impl ClassificationRules {
    pub fn classify_radius(&self, radius: Option<f64>) -> CodeDigit {
        let radius = match radius {
            Some(r) if !r.is_nan() => r,
            _ => return CodeDigit::unknown(self.radius_sentinel),
        };
        let code = self
            .radius_buckets
            .iter()
            .find(|bucket| radius > bucket.above)
            .map(|bucket| bucket.code)
            .unwrap_or(self.radius_fallback_code);
        CodeDigit::known(code)
    }

    pub fn classify_tie(&self, tie_type: Option<&str>) -> CodeDigit {
        match tie_type.and_then(|v| match_rules(&self.tie_rules, v)) {
            Some(code) => CodeDigit::known(code),
            None => CodeDigit::unknown(self.tie_sentinel),
        }
    }

    pub fn classify_rail(&self, rail_profile: Option<&str>) -> CodeDigit {
        match rail_profile.and_then(|v| match_rules(&self.rail_rules, v)) {
            Some(code) => CodeDigit::known(code),
            None => CodeDigit::unknown(self.rail_sentinel),
        }
    }

    pub fn classify_steel(&self, steel_grade: Option<&str>) -> CodeDigit {
        match steel_grade {
            None => CodeDigit::unknown(self.steel_sentinel),
            Some(v) => match match_rules(&self.steel_rules, v) {
                Some(code) => CodeDigit::known(code),
                None => CodeDigit::unknown(self.steel_other_code),
            },
        }
    }

    /// 拼接 8 位编码
    pub fn compose(&self, radius: char, tie: char, rail: char, steel: char) -> String {
        let mut code = String::with_capacity(ELEMENT_CODE_LEN);
        code.push_str(&self.code_prefix);
        code.push(radius);
        code.push(tie);
        code.push(rail);
        code.push(steel);
        code.push_str(&self.code_suffix);
        code
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let len = self.code_prefix.chars().count() + self.code_suffix.chars().count() + 4;
        if len != ELEMENT_CODE_LEN {
            return Err(ConfigError::invalid(
                "classification.code_prefix",
                format!("{}|{}", self.code_prefix, self.code_suffix),
                "前后缀长度与 8 位编码不符",
            ));
        }
        if self.radius_buckets.iter().any(|b| !b.above.is_finite()) {
            return Err(ConfigError::invalid(
                "classification.radius_buckets",
                "non-finite",
                "半径分档阈值必须为有限数值",
            ));
        }
        if self
            .radius_buckets
            .windows(2)
            .any(|pair| pair[0].above <= pair[1].above)
        {
            return Err(ConfigError::invalid(
                "classification.radius_buckets",
                "unordered",
                "半径分档阈值必须严格降序",
            ));
        }
        Ok(())
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            code_prefix: "31".to_string(),
            code_suffix: "11".to_string(),
            radius_buckets: vec![
                RadiusBucket { above: 600.0, code: '1' },
                RadiusBucket { above: 300.0, code: '2' },
                RadiusBucket { above: 120.0, code: '3' },
                RadiusBucket { above: 80.0, code: '4' },
            ],
            radius_fallback_code: '5',
            radius_sentinel: 'F',
            tie_rules: vec![
                CategoryRule::new(MatchPattern::Exact("Concrete".to_string()), '1'),
                CategoryRule::new(MatchPattern::Exact("Béton".to_string()), '1'),
                CategoryRule::new(MatchPattern::Exact("Wood".to_string()), '3'),
                CategoryRule::new(MatchPattern::Exact("Bois".to_string()), '3'),
                CategoryRule::new(MatchPattern::Prefix("Steel".to_string()), '4'),
                CategoryRule::new(MatchPattern::Contains("Acier".to_string()), '4'),
            ],
            tie_sentinel: 'F',
            rail_rules: vec![
                CategoryRule::new(MatchPattern::Contains("46 E1".to_string()), '2'),
                CategoryRule::new(MatchPattern::Contains("54 E2".to_string()), '1'),
            ],
            rail_sentinel: 'E',
            steel_rules: vec![
                CategoryRule::new(MatchPattern::Exact("R 260".to_string()), '1'),
                CategoryRule::new(MatchPattern::Exact("R 350 HT".to_string()), '2'),
            ],
            steel_other_code: '3',
            steel_sentinel: 'F',
        }
    }
}

// ==========================================
// FrequencyTable - 年增长频率表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub version: String,
    /// 表外编码的保守缺省频率（非零）
    pub default_frequency: f64,
    pub entries: BTreeMap<String, f64>,
}

/// CSV 行结构
#[derive(Debug, Deserialize)]
struct FrequencyRow {
    element_code: String,
    frequency: f64,
}

impl FrequencyTable {
    /// 查表
    ///
    /// # 返回
    /// (频率, 是否命中频率表)
    pub fn lookup(&self, element_code: &str) -> (f64, bool) {
        match self.entries.get(element_code) {
            Some(freq) => (*freq, true),
            None => (self.default_frequency, false),
        }
    }

    /// 现场观测版本频率表
    pub fn builtin() -> Self {
        let raw: [(&str, f64); 30] = [
            ("31112211", 0.000), ("31212211", 0.000), ("31312211", 0.067), ("31412211", 0.100), ("31512211", 0.120),
            ("31132211", 0.000), ("31232211", 0.000), ("31332211", 0.100), ("31432211", 0.120), ("31532211", 0.120),
            ("31142211", 0.000), ("31242211", 0.000), ("31342211", 0.075), ("31442211", 0.100), ("31542211", 0.133),
            ("31112111", 0.000), ("31212111", 0.000), ("31312111", 0.133), ("31412111", 0.200), ("31512111", 0.240),
            ("31132111", 0.000), ("31232111", 0.000), ("31332111", 0.133), ("31432111", 0.200), ("31532111", 0.240),
            ("31142111", 0.000), ("31242111", 0.000), ("31342111", 0.100), ("31442111", 0.200), ("31542111", 0.250),
        ];

        Self {
            version: "2025-01".to_string(),
            default_frequency: 0.15,
            entries: raw
                .iter()
                .map(|(code, freq)| (code.to_string(), *freq))
                .collect(),
        }
    }

    /// 从 CSV 读取（表头: element_code,frequency）
    pub fn from_csv_reader<R: Read>(
        reader: R,
        version: &str,
        default_frequency: f64,
    ) -> ConfigResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = BTreeMap::new();
        for (idx, row) in csv_reader.deserialize::<FrequencyRow>().enumerate() {
            let row = row?;
            // 表头占第 1 行
            let row_no = idx + 2;
            if row.element_code.chars().count() != ELEMENT_CODE_LEN {
                return Err(ConfigError::InvalidFrequencyEntry {
                    row: row_no,
                    code: row.element_code,
                    message: "编码长度必须为 8".to_string(),
                });
            }
            if entries.insert(row.element_code.clone(), row.frequency).is_some() {
                return Err(ConfigError::InvalidFrequencyEntry {
                    row: row_no,
                    code: row.element_code,
                    message: "编码重复".to_string(),
                });
            }
        }

        let table = Self {
            version: version.to_string(),
            default_frequency,
            entries,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_csv_path(
        path: impl AsRef<Path>,
        version: &str,
        default_frequency: f64,
    ) -> ConfigResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file, version, default_frequency)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.default_frequency.is_finite() || self.default_frequency <= 0.0 {
            return Err(ConfigError::invalid(
                "frequencies.default_frequency",
                self.default_frequency,
                "缺省频率必须为正的有限数值",
            ));
        }
        for (code, freq) in &self.entries {
            if !freq.is_finite() || *freq < 0.0 {
                return Err(ConfigError::InvalidFrequencyEntry {
                    row: 0,
                    code: code.clone(),
                    message: format!("频率无效: {}", freq),
                });
            }
        }
        Ok(())
    }
}

// ==========================================
// Calibration - 标定数据包
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub classification: ClassificationRules,
    pub frequencies: FrequencyTable,
}

impl Calibration {
    pub fn builtin() -> Self {
        Self {
            classification: ClassificationRules::default(),
            frequencies: FrequencyTable::builtin(),
        }
    }

    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let calibration: Calibration = serde_json::from_str(raw)?;
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn version(&self) -> &str {
        &self.frequencies.version
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.classification.validate()?;
        self.frequencies.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_buckets() {
        let rules = ClassificationRules::default();
        assert_eq!(rules.classify_radius(Some(601.0)).code, '1');
        assert_eq!(rules.classify_radius(Some(600.0)).code, '2');
        assert_eq!(rules.classify_radius(Some(300.0)).code, '3');
        assert_eq!(rules.classify_radius(Some(120.0)).code, '4');
        assert_eq!(rules.classify_radius(Some(80.0)).code, '5');
        assert_eq!(rules.classify_radius(Some(12.0)).code, '5');

        let missing = rules.classify_radius(None);
        assert_eq!(missing.code, 'F');
        assert!(!missing.recognised);
    }

    #[test]
    fn test_tie_rules_cover_steel_variants() {
        let rules = ClassificationRules::default();
        assert_eq!(rules.classify_tie(Some("Concrete")).code, '1');
        assert_eq!(rules.classify_tie(Some("Wood")).code, '3');
        assert_eq!(rules.classify_tie(Some("Steel (long)")).code, '4');
        assert_eq!(rules.classify_tie(Some("Acier (bêches courtes)")).code, '4');
        let unknown = rules.classify_tie(Some("Plastic"));
        assert_eq!(unknown.code, 'F');
        assert!(!unknown.recognised);
    }

    #[test]
    fn test_steel_grade_other_and_missing() {
        let rules = ClassificationRules::default();
        assert_eq!(rules.classify_steel(Some("R 260")).code, '1');
        assert_eq!(rules.classify_steel(Some("R 350 HT")).code, '2');
        let other = rules.classify_steel(Some("R 200"));
        assert_eq!(other.code, '3');
        assert!(!other.recognised);
        assert_eq!(rules.classify_steel(None).code, 'F');
    }

    #[test]
    fn test_compose_is_eight_chars() {
        let rules = ClassificationRules::default();
        let code = rules.compose('3', '1', '2', '1');
        assert_eq!(code, "31312111");
        assert_eq!(code.len(), ELEMENT_CODE_LEN);
    }

    #[test]
    fn test_builtin_lookup_and_default() {
        let table = FrequencyTable::builtin();
        assert_eq!(table.lookup("31312211"), (0.067, true));
        assert_eq!(table.lookup("31FFEF11"), (0.15, false));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_csv_reader() {
        let raw = "element_code,frequency\n31312211, 0.05\n31412211,0.1\n";
        let table = FrequencyTable::from_csv_reader(raw.as_bytes(), "test", 0.14).unwrap();
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.lookup("31312211"), (0.05, true));
        assert_eq!(table.default_frequency, 0.14);
    }

    #[test]
    fn test_csv_reader_rejects_short_code() {
        let raw = "element_code,frequency\n3131,0.05\n";
        let err = FrequencyTable::from_csv_reader(raw.as_bytes(), "test", 0.14).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFrequencyEntry { row: 2, .. }));
    }
}
