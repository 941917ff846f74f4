use std::collections::BTreeMap;

/// Sparse feature vector as `(vocabulary index, value)` pairs in index order.
pub type SparseVector = Vec<(usize, f64)>;

/// Vocabulary and smoothed IDF weights fitted on a tokenized corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedVocabulary {
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f64>,
}

/// Keep the `max_features` tokens with the highest document frequency.
///
/// Ties are broken by token so the result never depends on corpus order.
/// Indices follow rank. IDF is `ln((1 + n) / (1 + df)) + 1`.
pub fn fit(documents: &[Vec<String>], max_features: usize) -> FittedVocabulary {
    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in documents {
        let mut seen: Vec<&str> = doc.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for token in seen {
            *document_frequency.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = document_frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_features);

    let n = documents.len() as f64;
    let mut vocabulary = BTreeMap::new();
    let mut idf = Vec::with_capacity(ranked.len());
    for (idx, (token, df)) in ranked.into_iter().enumerate() {
        vocabulary.insert(token.to_string(), idx);
        idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
    }

    FittedVocabulary { vocabulary, idf }
}

/// Term count × IDF, L2-normalized. Out-of-vocabulary tokens are dropped;
/// a document with no known tokens yields an empty vector.
pub fn transform(tokens: &[String], vocabulary: &BTreeMap<String, usize>, idf: &[f64]) -> SparseVector {
    let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
    for token in tokens {
        if let Some(&idx) = vocabulary.get(token) {
            *counts.entry(idx).or_insert(0.0) += 1.0;
        }
    }

    let mut features: SparseVector = counts
        .into_iter()
        .map(|(idx, count)| (idx, count * idf[idx]))
        .collect();

    let norm = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, v) in &mut features {
            *v /= norm;
        }
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_fit_caps_by_document_frequency() {
        let corpus = docs(&["fraud bribe", "fraud fraud", "fraud ofac", "bribe"]);
        let fitted = fit(&corpus, 2);
        // df: fraud=3, bribe=2, ofac=1; repeats inside a doc count once.
        assert_eq!(fitted.vocabulary.len(), 2);
        assert_eq!(fitted.vocabulary["fraud"], 0);
        assert_eq!(fitted.vocabulary["bribe"], 1);
        assert!(!fitted.vocabulary.contains_key("ofac"));
    }

    #[test]
    fn test_fit_tie_break_is_lexicographic() {
        let corpus = docs(&["zeta alpha", "mid"]);
        let fitted = fit(&corpus, 10);
        assert_eq!(fitted.vocabulary["alpha"], 0);
        assert_eq!(fitted.vocabulary["mid"], 1);
        assert_eq!(fitted.vocabulary["zeta"], 2);
    }

    #[test]
    fn test_idf_rarer_is_heavier() {
        let corpus = docs(&["common rare", "common", "common"]);
        let fitted = fit(&corpus, 10);
        let common = fitted.idf[fitted.vocabulary["common"]];
        let rare = fitted.idf[fitted.vocabulary["rare"]];
        assert!((common - 1.0).abs() < 1e-12);
        assert!(rare > common);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let corpus = docs(&["fraud bribe", "fraud", "ofac"]);
        let fitted = fit(&corpus, 10);
        let tokens: Vec<String> = vec!["fraud".into(), "fraud".into(), "bribe".into(), "unseen".into()];
        let v = transform(&tokens, &fitted.vocabulary, &fitted.idf);
        assert_eq!(v.len(), 2);
        let norm: f64 = v.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(v.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_transform_all_unknown_is_empty() {
        let corpus = docs(&["fraud"]);
        let fitted = fit(&corpus, 10);
        let v = transform(&["nothing".to_string()], &fitted.vocabulary, &fitted.idf);
        assert!(v.is_empty());
    }
}
