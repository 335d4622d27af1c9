//! Two-tier catalog matching.
//!
//! Tier 1 scores every candidate row on model, product name, and brand
//! overlap and takes the best scorer. Tier 2 runs only when tier 1 finds
//! nothing: an ordered fallback cascade (code-in-model substring, bore-only,
//! name keywords) whose candidates are deduplicated and ranked by
//! confidence. Finding nothing at either tier is a legitimate terminal
//! outcome, not an error.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::table::CatalogRow;

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Tier-1 weighted model/name/brand score.
    Weighted,
    /// Tier-2 canonical-code substring against the model column.
    Model,
    /// Tier-2 bore-only match against the specification column.
    Bore,
    /// Tier-2 keyword hit from the product name.
    Keyword,
    /// No strategy matched.
    Unmatched,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Model => "model",
            Self::Bore => "bore",
            Self::Keyword => "keyword",
            Self::Unmatched => "unmatched",
        }
    }
}

/// Outcome of matching one inquiry row against one catalog. Created fresh
/// per row, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    pub model: String,
    pub specification: String,
    pub brand: String,
    pub price: f64,
    pub confidence: f32,
    pub kind: MatchKind,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self {
            matched: false,
            model: String::new(),
            specification: String::new(),
            brand: String::new(),
            price: 0.0,
            confidence: 0.0,
            kind: MatchKind::Unmatched,
        }
    }

    fn hit(row: &CatalogRow, confidence: f32, kind: MatchKind) -> Self {
        Self {
            matched: true,
            model: row.model.clone(),
            specification: row.specification.clone(),
            brand: row.brand.clone(),
            price: row.price,
            confidence,
            kind,
        }
    }
}

/// Find the best-matching catalog row for one inquiry line.
///
/// `canonical_code` is the composed designation (may be empty when
/// resolution failed); `selected_brand` restricts tier 1 to that brand.
pub fn match_catalog(
    product_name: &str,
    specification: &str,
    canonical_code: &str,
    catalog: &[CatalogRow],
    selected_brand: Option<&str>,
) -> MatchResult {
    let bore = bore_digits(specification);

    if let Some(result) = weighted_match(
        product_name,
        canonical_code,
        catalog,
        selected_brand,
        bore.as_deref(),
    ) {
        debug!(model = %result.model, confidence = result.confidence, "tier-1 match");
        return result;
    }

    if let Some(result) = fallback_match(product_name, canonical_code, catalog, bore.as_deref()) {
        debug!(model = %result.model, kind = result.kind.as_str(), "tier-2 match");
        return result;
    }

    MatchResult::no_match()
}

/// Strip all whitespace and case-fold.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<String>().to_lowercase()
}

// ── Tier 1 ──

fn weighted_match(
    product_name: &str,
    canonical_code: &str,
    catalog: &[CatalogRow],
    selected_brand: Option<&str>,
    bore: Option<&str>,
) -> Option<MatchResult> {
    let q_model = normalize(canonical_code);
    let q_name = normalize(product_name);
    let q_brand = selected_brand.map(normalize).filter(|b| !b.is_empty());

    let mut best: Option<&CatalogRow> = None;
    let mut best_score = 0u32;

    for row in catalog {
        if let Some(qb) = &q_brand
            && normalize(&row.brand) != *qb
        {
            continue;
        }
        if let Some(d) = bore
            && !row.specification.contains(d)
        {
            continue;
        }

        let mut score = 0u32;
        let p_model = normalize(&row.model);
        let p_name = normalize(&row.name);
        let p_brand = normalize(&row.brand);

        if !q_model.is_empty() && !p_model.is_empty() {
            if q_model == p_model {
                score += 10;
            } else if p_model.contains(&q_model) || q_model.contains(&p_model) {
                score += 6;
            }
        }
        if !q_name.is_empty() && !p_name.is_empty() {
            if q_name == p_name {
                score += 5;
            } else if p_name.contains(&q_name) || q_name.contains(&p_name) {
                score += 3;
            }
        }
        if let Some(qb) = &q_brand
            && !p_brand.is_empty()
        {
            if *qb == p_brand {
                score += 2;
            } else if p_brand.contains(qb.as_str()) || qb.contains(&p_brand) {
                score += 1;
            }
        }

        if score > best_score {
            best_score = score;
            best = Some(row);
        }
    }

    best.map(|row| {
        let confidence = if best_score >= 15 { 0.95 } else { 0.8 };
        MatchResult::hit(row, confidence, MatchKind::Weighted)
    })
}

// ── Tier 2 ──

/// Valve-type keywords recognised in free-form product names.
const NAME_KEYWORDS: &[&str] = &[
    "球阀", "闸阀", "截止阀", "止回阀", "蝶阀", "调节阀", "安全阀", "减压阀", "电磁阀",
    "针型阀", "隔膜阀", "旋塞阀", "柱塞阀", "排气阀", "排泥阀",
];

static MODEL_FRAGMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+\d*[A-Z]*").unwrap());

struct Candidate<'a> {
    row: &'a CatalogRow,
    confidence: f32,
    kind: MatchKind,
}

fn fallback_match(
    product_name: &str,
    canonical_code: &str,
    catalog: &[CatalogRow],
    bore: Option<&str>,
) -> Option<MatchResult> {
    let mut candidates: Vec<Candidate> = Vec::new();

    // (a) canonical code as a substring of the model column.
    let q_model = normalize(canonical_code);
    if !q_model.is_empty() {
        for row in catalog {
            if normalize(&row.model).contains(&q_model)
                && bore.is_none_or(|d| row.specification.contains(d))
            {
                candidates.push(Candidate {
                    row,
                    confidence: 0.9,
                    kind: MatchKind::Model,
                });
            }
        }
    }

    // (b) bore-only against the specification column.
    if let Some(d) = bore {
        for row in catalog {
            if row.specification.contains(d) {
                candidates.push(Candidate {
                    row,
                    confidence: 0.7,
                    kind: MatchKind::Bore,
                });
            }
        }
    }

    // (c) valve-type keywords and model fragments from the product name.
    for keyword in name_keywords(product_name) {
        let needle = keyword.to_lowercase();
        for row in catalog {
            if normalize(&row.model).contains(&needle)
                && bore.is_none_or(|d| row.specification.contains(d))
            {
                candidates.push(Candidate {
                    row,
                    confidence: 0.5,
                    kind: MatchKind::Keyword,
                });
            }
        }
    }

    // Deduplicate by (model, specification, brand), keeping the first
    // (highest-priority) candidate, then rank by confidence.
    let mut seen: Vec<(&str, &str, &str)> = Vec::new();
    candidates.retain(|c| {
        let key = (
            c.row.model.as_str(),
            c.row.specification.as_str(),
            c.row.brand.as_str(),
        );
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
        .first()
        .map(|c| MatchResult::hit(c.row, c.confidence, c.kind))
}

/// Keywords worth searching the model column for: recognised valve types
/// plus alphanumeric model fragments (two or more characters).
fn name_keywords(product_name: &str) -> Vec<String> {
    let mut keywords: Vec<String> = NAME_KEYWORDS
        .iter()
        .filter(|k| product_name.contains(*k))
        .map(|k| (*k).to_string())
        .collect();

    let upper = product_name.to_uppercase();
    for m in MODEL_FRAGMENT_RE.find_iter(&upper) {
        let fragment = m.as_str();
        if fragment.chars().count() >= 2 {
            keywords.push(fragment.to_string());
        }
    }
    keywords
}

/// Bore digits from an inquiry specification, for candidate pre-filtering.
/// Falls back to the first bare number when no DN-style marker is present.
fn bore_digits(specification: &str) -> Option<String> {
    static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)DN\s*(\d+)",
            r"[φΦ∅]\s*(\d+)",
            r"直径\s*(\d+)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });
    static ANY_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

    let spec = specification.trim();
    if spec.is_empty() {
        return None;
    }
    for pattern in PATTERNS.iter() {
        if let Some(c) = pattern.captures(spec) {
            return Some(c[1].to_string());
        }
    }
    ANY_NUMBER_RE.find(spec).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(model: &str, spec: &str, brand: &str, price: f64) -> CatalogRow {
        CatalogRow {
            name: String::new(),
            model: model.to_string(),
            specification: spec.to_string(),
            brand: brand.to_string(),
            price,
        }
    }

    fn named_row(name: &str, model: &str, spec: &str, brand: &str, price: f64) -> CatalogRow {
        CatalogRow {
            name: name.to_string(),
            ..row(model, spec, brand, price)
        }
    }

    #[test]
    fn exact_code_and_brand_is_high_confidence() {
        let catalog = vec![
            row("Z41X-16Q", "DN50", "A", 230.0),
            row("Z41X-16Q", "DN65", "A", 280.0),
            row("D71X-16Q", "DN50", "A", 180.0),
        ];
        // Model exact (+10) + name partial vs empty (0) + brand exact (+2)
        // is below 15, so include a name hit to cross the threshold.
        let catalog_named: Vec<CatalogRow> = catalog
            .iter()
            .map(|r| CatalogRow {
                name: "闸阀".to_string(),
                ..r.clone()
            })
            .collect();
        let result = match_catalog("闸阀", "DN50", "Z41X-16Q", &catalog_named, Some("A"));
        assert!(result.matched);
        assert_eq!(result.model, "Z41X-16Q");
        assert_eq!(result.specification, "DN50");
        assert_eq!(result.price, 230.0);
        assert_eq!(result.kind, MatchKind::Weighted);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn weighted_score_below_threshold_is_medium_confidence() {
        let catalog = vec![row("Z41X-16Q", "DN50", "", 230.0)];
        let result = match_catalog("", "DN50", "Z41X-16Q", &catalog, None);
        assert!(result.matched);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn whitespace_and_case_normalized() {
        let catalog = vec![row("z41x - 16q", "DN50", "", 230.0)];
        let result = match_catalog("", "DN50", "Z41X-16Q", &catalog, None);
        assert!(result.matched);
        assert_eq!(result.kind, MatchKind::Weighted);
    }

    #[test]
    fn bore_filter_prefers_matching_specification() {
        let catalog = vec![
            row("Z41X-16Q", "DN65", "", 280.0),
            row("Z41X-16Q", "DN50", "", 230.0),
        ];
        let result = match_catalog("闸阀", "DN50", "Z41X-16Q", &catalog, None);
        assert_eq!(result.price, 230.0);
    }

    #[test]
    fn containment_scores_lower_than_exact() {
        let catalog = vec![
            named_row("闸阀", "Z41X-16Q-B", "DN50", "", 250.0),
            named_row("闸阀", "Z41X-16Q", "DN50", "", 230.0),
        ];
        let result = match_catalog("闸阀", "DN50", "Z41X-16Q", &catalog, None);
        assert_eq!(result.model, "Z41X-16Q");
    }

    #[test]
    fn unknown_brand_filter_falls_through_to_tier2() {
        // Flagged in the design notes: an empty tier-1 candidate set drops
        // to tier 2 without the brand restriction.
        let catalog = vec![row("Z41X-16Q", "DN50", "A", 230.0)];
        let result = match_catalog("闸阀", "DN50", "Z41X-16Q", &catalog, Some("B"));
        assert!(result.matched);
        assert_eq!(result.kind, MatchKind::Model);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn bore_only_fallback() {
        let catalog = vec![row("H44X-16Q", "DN80", "", 300.0)];
        let result = match_catalog("不知名产品", "DN80", "", &catalog, None);
        assert!(result.matched);
        assert_eq!(result.kind, MatchKind::Bore);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn keyword_fallback_from_model_fragments() {
        let catalog = vec![row("J41H-25C", "DN50", "", 120.0)];
        // No canonical code, no usable bore, but the name carries a model
        // fragment.
        let result = match_catalog("J41H 截止阀", "", "", &catalog, None);
        assert!(result.matched);
        assert_eq!(result.kind, MatchKind::Keyword);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn fallback_candidates_deduplicated_and_ranked() {
        // The same row qualifies via code substring (0.9) and bore (0.7);
        // the higher-priority candidate must win after deduplication.
        let catalog = vec![row("Z41X-16Q", "DN50", "A", 230.0)];
        let result = match_catalog("泵配件", "DN50", "Z41X", &catalog, Some("missing"));
        assert_eq!(result.kind, MatchKind::Model);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn no_overlap_returns_no_match() {
        let catalog = vec![row("D71X-16Q", "DN100", "A", 180.0)];
        let result = match_catalog("电机", "", "ZZZ-99", &catalog, None);
        assert!(!result.matched);
        assert_eq!(result.kind, MatchKind::Unmatched);
        assert_eq!(result.price, 0.0);
    }

    #[test]
    fn empty_catalog_is_no_match() {
        let result = match_catalog("闸阀", "DN50", "Z41X-16Q", &[], None);
        assert!(!result.matched);
    }

    #[test]
    fn more_overlap_never_scores_worse() {
        // Monotonicity: adding brand agreement can only improve the winner.
        let catalog = vec![row("Z41X-16Q", "DN50", "A", 230.0)];
        let without = match_catalog("闸阀", "DN50", "Z41X-16Q", &catalog, None);
        let with = match_catalog("闸阀", "DN50", "Z41X-16Q", &catalog, Some("A"));
        assert!(with.confidence >= without.confidence);
    }

    #[test]
    fn bore_digits_patterns() {
        assert_eq!(bore_digits("DN50"), Some("50".to_string()));
        assert_eq!(bore_digits("dn 80"), Some("80".to_string()));
        assert_eq!(bore_digits("φ100"), Some("100".to_string()));
        assert_eq!(bore_digits("直径65"), Some("65".to_string()));
        assert_eq!(bore_digits("4寸(100)"), Some("4".to_string()));
        assert_eq!(bore_digits(""), None);
    }
}
