//! Binary transaction-by-defect-code matrices

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use tracing::debug;

use crate::cluster::Cluster;
use crate::data::Inspection;
use crate::error::AnalysisError;

/// Row and pair counts for two columns of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCounts {
    pub count_x: usize,
    pub count_y: usize,
    pub count_xy: usize,
}

/// One row per transaction, one column per vocabulary code.
///
/// A cell is 1 when the transaction contains the code.
#[derive(Debug, Clone, PartialEq)]
pub struct CoOccurrenceMatrix {
    vocabulary: Vec<String>,
    cells: Array2<u8>,
}

impl CoOccurrenceMatrix {
    /// Build a matrix from transactions given as code iterators.
    ///
    /// Codes outside `vocabulary` set no bit.
    pub fn from_transactions<'a, I, T>(transactions: I, vocabulary: &[String]) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = &'a str>,
    {
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, code)| (code.as_str(), i))
            .collect();

        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut ignored = 0usize;
        for transaction in transactions {
            let mut columns = Vec::new();
            for code in transaction {
                match index.get(code) {
                    Some(&column) => columns.push(column),
                    None => ignored += 1,
                }
            }
            rows.push(columns);
        }

        let mut cells = Array2::zeros((rows.len(), vocabulary.len()));
        for (row, columns) in rows.iter().enumerate() {
            for &column in columns {
                cells[[row, column]] = 1;
            }
        }

        if ignored > 0 {
            debug!(ignored, "Ignored codes outside the analysed vocabulary");
        }

        Self {
            vocabulary: vocabulary.to_vec(),
            cells,
        }
    }

    /// One transaction per cluster, in cluster order
    pub fn from_clusters(clusters: &[Cluster], vocabulary: &[String]) -> Self {
        Self::from_transactions(clusters.iter().map(|c| c.codes()), vocabulary)
    }

    /// One transaction per inspection, in inspection order
    pub fn from_inspections(inspections: &[Inspection], vocabulary: &[String]) -> Self {
        Self::from_transactions(
            inspections
                .iter()
                .map(|i| i.observations().iter().map(|o| o.defect_code.as_str())),
            vocabulary,
        )
    }

    /// Wrap explicit cells, checking shape and that every cell is 0 or 1
    pub fn from_cells(vocabulary: Vec<String>, cells: Array2<u8>) -> Result<Self, AnalysisError> {
        if cells.ncols() != vocabulary.len() {
            return Err(AnalysisError::VocabularyMismatch {
                columns: cells.ncols(),
                vocabulary: vocabulary.len(),
            });
        }
        if let Some(((row, column), &value)) = cells.indexed_iter().find(|(_, value)| **value > 1) {
            return Err(AnalysisError::NonBinaryCell { row, column, value });
        }
        Ok(Self { vocabulary, cells })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn cells(&self) -> &Array2<u8> {
        &self.cells
    }

    /// Number of transactions
    pub fn n_rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn is_set(&self, row: usize, column: usize) -> bool {
        self.cells[[row, column]] == 1
    }

    pub fn column(&self, column: usize) -> ArrayView1<'_, u8> {
        self.cells.column(column)
    }

    /// Rows in which `column` is set
    pub fn column_count(&self, column: usize) -> usize {
        self.column(column).iter().filter(|&&v| v == 1).count()
    }

    /// Count rows with x set, y set, and both set
    pub fn pair_counts(&self, x: usize, y: usize) -> PairCounts {
        let (count_x, count_y, count_xy) = self
            .column(x)
            .iter()
            .zip(self.column(y).iter())
            .fold((0, 0, 0), |(cx, cy, cxy), (&a, &b)| {
                (
                    cx + usize::from(a == 1),
                    cy + usize::from(b == 1),
                    cxy + usize::from(a == 1 && b == 1),
                )
            });
        PairCounts {
            count_x,
            count_y,
            count_xy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DefectObservation;
    use ndarray::array;

    fn vocab(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn cluster(codes: &[&str]) -> Cluster {
        let members = codes
            .iter()
            .enumerate()
            .map(|(i, code)| DefectObservation::new("A", *code, i as f64))
            .collect();
        Cluster::from_members(members).unwrap()
    }

    #[test]
    fn test_from_clusters() {
        let clusters = vec![
            cluster(&["FL", "CM", "FL"]),
            cluster(&["CC"]),
            cluster(&["CM", "RFB"]),
        ];
        let matrix = CoOccurrenceMatrix::from_clusters(&clusters, &vocab(&["FL", "CM", "CC"]));

        assert_eq!(
            matrix.cells(),
            &array![[1u8, 1, 0], [0, 0, 1], [0, 1, 0]]
        );
        assert_eq!(matrix.n_rows(), 3);
        assert!(matrix.is_set(0, 0));
        assert!(!matrix.is_set(2, 2));
    }

    #[test]
    fn test_from_inspections() {
        let inspections = vec![
            Inspection::new(
                "A",
                vec![
                    DefectObservation::new("A", "FL", 0.0),
                    DefectObservation::new("A", "CC", 900.0),
                ],
            )
            .unwrap(),
            Inspection::new("B", vec![DefectObservation::new("B", "CM", 1.0)]).unwrap(),
        ];
        let matrix = CoOccurrenceMatrix::from_inspections(&inspections, &vocab(&["FL", "CM", "CC"]));
        assert_eq!(matrix.cells(), &array![[1u8, 0, 1], [0, 1, 0]]);
    }

    #[test]
    fn test_empty_inputs() {
        let matrix = CoOccurrenceMatrix::from_clusters(&[], &vocab(&["FL", "CM"]));
        assert_eq!(matrix.n_rows(), 0);
        assert_eq!(matrix.column_count(0), 0);
    }

    #[test]
    fn test_pair_counts() {
        let matrix = CoOccurrenceMatrix::from_cells(
            vocab(&["A", "B"]),
            array![[1u8, 1], [1, 0], [0, 1], [1, 1]],
        )
        .unwrap();

        assert_eq!(
            matrix.pair_counts(0, 1),
            PairCounts {
                count_x: 3,
                count_y: 3,
                count_xy: 2
            }
        );
        assert_eq!(matrix.column_count(1), 3);
    }

    #[test]
    fn test_from_cells_validation() {
        let result = CoOccurrenceMatrix::from_cells(vocab(&["A"]), array![[1u8, 0]]);
        assert_eq!(
            result,
            Err(AnalysisError::VocabularyMismatch {
                columns: 2,
                vocabulary: 1
            })
        );

        let result = CoOccurrenceMatrix::from_cells(vocab(&["A", "B"]), array![[1u8, 0], [0, 2]]);
        assert_eq!(
            result,
            Err(AnalysisError::NonBinaryCell {
                row: 1,
                column: 1,
                value: 2
            })
        );
    }
}
