// encoder.rs
//
// One-hot encoding of the categorical inputs. Each categorical field gets a
// sorted vocabulary learned from the training rows; the feature vector is one
// indicator block per field (in `CategoricalField::ALL` order) followed by the
// passthrough temperature column.

use crate::error::UnknownCategory;
use crate::shared_data::{CategoricalField, TrafficFeatures};
use std::collections::BTreeSet;

/// Learned vocabulary for a single categorical field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldVocabulary {
    pub field: CategoricalField,
    pub categories: Vec<String>,
}

impl FieldVocabulary {
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    vocabularies: Vec<FieldVocabulary>,
}

impl OneHotEncoder {
    /// Learns the distinct values of every categorical field.
    pub fn fit(rows: &[TrafficFeatures]) -> Self {
        let vocabularies = CategoricalField::ALL
            .iter()
            .map(|&field| {
                let distinct: BTreeSet<&str> = rows.iter().map(|r| r.category(field)).collect();
                FieldVocabulary {
                    field,
                    categories: distinct.into_iter().map(String::from).collect(),
                }
            })
            .collect();
        Self { vocabularies }
    }

    pub fn vocabularies(&self) -> &[FieldVocabulary] {
        &self.vocabularies
    }

    pub fn vocabulary(&self, field: CategoricalField) -> &FieldVocabulary {
        // `fit` always builds one vocabulary per field, in `ALL` order.
        &self.vocabularies[field as usize]
    }

    /// Width of the encoded vector, temperature included.
    pub fn n_features(&self) -> usize {
        self.n_categorical() + 1
    }

    fn n_categorical(&self) -> usize {
        self.vocabularies.iter().map(|v| v.categories.len()).sum()
    }

    fn offset_of(&self, field: CategoricalField) -> usize {
        self.vocabularies
            .iter()
            .take_while(|v| v.field != field)
            .map(|v| v.categories.len())
            .sum()
    }

    /// Column index of `value` in the encoded vector.
    pub fn category_index(
        &self,
        field: CategoricalField,
        value: &str,
    ) -> Result<usize, UnknownCategory> {
        let vocab = self.vocabulary(field);
        match vocab.index_of(value) {
            Some(i) => Ok(self.offset_of(field) + i),
            None => Err(UnknownCategory {
                field,
                value: value.to_string(),
                known: vocab.categories.clone(),
            }),
        }
    }

    /// Inverse of `category_index`.
    pub fn category_at(&self, field: CategoricalField, column: usize) -> Option<&str> {
        let offset = self.offset_of(field);
        let vocab = self.vocabulary(field);
        column
            .checked_sub(offset)
            .and_then(|i| vocab.categories.get(i))
            .map(String::as_str)
    }

    pub fn transform(&self, row: &TrafficFeatures) -> Result<Vec<f64>, UnknownCategory> {
        let mut encoded = vec![0.0; self.n_features()];
        for field in CategoricalField::ALL {
            let column = self.category_index(field, row.category(field))?;
            encoded[column] = 1.0;
        }
        encoded[self.n_categorical()] = row.temperature;
        Ok(encoded)
    }

    /// Column names such as `day_of_week_monday`, in encoded order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .vocabularies
            .iter()
            .flat_map(|v| {
                v.categories
                    .iter()
                    .map(move |c| format!("{}_{}", v.field.name(), c))
            })
            .collect();
        names.push("temperature".to_string());
        names
    }
}
