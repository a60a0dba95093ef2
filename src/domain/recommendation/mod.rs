//! Turns the importance ranking into a single piece of production advice

use serde::Serialize;

use crate::domain::feature::Feature;
use crate::domain::importance::FeatureImportance;
use crate::domain::DomainError;

/// Advice per feature. Extend or reword here; the advisor only looks entries up.
pub const ADVICE_TABLE: &[(Feature, &str)] = &[
    (
        Feature::Alcohol,
        "Alcohol content is the strongest quality signal. Ensure complete fermentation and harvest at full ripeness to reach the target alcohol level.",
    ),
    (
        Feature::VolatileAcidity,
        "Volatile acidity is driving quality. Limit oxygen exposure, keep sulfite levels adequate and watch for acetic bacteria to keep vinegar notes down.",
    ),
    (
        Feature::Sulphates,
        "Sulphates are a key driver. Review sulfite additions: adequate levels protect freshness and correlate with higher scores.",
    ),
    (
        Feature::TotalSulfurDioxide,
        "Total sulfur dioxide matters most. Avoid excessive cumulative SO2 additions that mute aroma and flatten the palate.",
    ),
    (
        Feature::FreeSulfurDioxide,
        "Free sulfur dioxide is the main driver. Keep free SO2 in the protective range without overshooting into sensory thresholds.",
    ),
    (
        Feature::Density,
        "Density dominates the model. Track sugar-to-alcohol conversion closely; a lower final density usually means a drier, better-rated wine.",
    ),
    (
        Feature::CitricAcid,
        "Citric acid leads the ranking. Small citric additions can lift freshness; monitor them together with total acidity.",
    ),
    (
        Feature::FixedAcidity,
        "Fixed acidity leads the ranking. Balance tartaric acid levels at harvest and consider acid adjustment before fermentation.",
    ),
    (
        Feature::ResidualSugar,
        "Residual sugar drives quality. Control fermentation stopping points to keep sweetness in balance with acidity.",
    ),
    (
        Feature::Chlorides,
        "Chlorides are the main driver. Reduce salt uptake by reviewing vineyard irrigation water and soil salinity.",
    ),
    (
        Feature::Ph,
        "pH is the main driver. Keep pH low enough for microbial stability and color retention, adjusting acidity where needed.",
    ),
];

/// Used only if a feature is ever missing from the table
const GENERIC_ADVICE: &str =
    "Focus process control on this attribute; it carries the most weight in quality predictions.";

/// Top driver and the matching advice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub primary_driver: Feature,
    pub advice: String,
}

/// Selects advice for the highest-ranked feature
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationAdvisor;

impl RecommendationAdvisor {
    pub fn advise(ranking: &[FeatureImportance]) -> Result<Recommendation, DomainError> {
        let top = ranking
            .first()
            .ok_or_else(|| DomainError::no_data("Feature ranking is empty"))?;

        Ok(Recommendation {
            primary_driver: top.feature,
            advice: advice_for(top.feature).to_string(),
        })
    }
}

/// Look up the advice text for a feature
pub fn advice_for(feature: Feature) -> &'static str {
    ADVICE_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == feature)
        .map(|(_, text)| *text)
        .unwrap_or(GENERIC_ADVICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_feature_has_advice() {
        for feature in Feature::ALL {
            assert_ne!(advice_for(feature), GENERIC_ADVICE, "no advice for {}", feature);
        }
        assert_eq!(ADVICE_TABLE.len(), Feature::ALL.len());
    }

    #[test]
    fn test_advise_picks_top_feature() {
        let ranking = vec![
            FeatureImportance {
                feature: Feature::Sulphates,
                importance: 0.6,
            },
            FeatureImportance {
                feature: Feature::Alcohol,
                importance: 0.4,
            },
        ];

        let recommendation = RecommendationAdvisor::advise(&ranking).unwrap();
        assert_eq!(recommendation.primary_driver, Feature::Sulphates);
        assert_eq!(recommendation.advice, advice_for(Feature::Sulphates));

        let json = serde_json::to_value(&recommendation).unwrap();
        assert_eq!(json["primary_driver"], "sulphates");
    }

    #[test]
    fn test_empty_ranking_is_no_data() {
        let err = RecommendationAdvisor::advise(&[]).unwrap_err();
        assert!(matches!(err, DomainError::NoData { .. }));
    }
}
