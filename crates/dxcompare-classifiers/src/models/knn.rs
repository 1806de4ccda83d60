use linfa_nn::distance::L2Dist;
use linfa_nn::{KdTree, NearestNeighbour};
use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::{
    argmax_rows, check_training_input, label_width, not_fitted, Classifier,
};

/// k nearest neighbours under Euclidean distance, uniform vote.
///
/// The training set is kept and a kd-tree is built over it for each
/// prediction batch.
pub struct KNeighborsClassifier {
    k: usize,
    train: Option<(Array2<f64>, Array1<usize>)>,
    n_classes: usize,
}

impl KNeighborsClassifier {
    pub fn new(k: usize) -> Self {
        KNeighborsClassifier {
            k: k.max(1),
            train: None,
            n_classes: 0,
        }
    }
}

impl Classifier for KNeighborsClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_training_input(x, y)?;
        self.train = Some((x.clone(), y.clone()));
        self.n_classes = label_width(y);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    /// Share of the `k` neighbours voting for each class.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (train_x, train_y) = self.train.as_ref().ok_or_else(|| not_fitted("K neighbors"))?;
        let k = self.k.min(train_x.nrows());
        let index = KdTree
            .from_batch(train_x, L2Dist)
            .map_err(PipelineError::model)?;

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (row, point) in x.axis_iter(Axis(0)).enumerate() {
            let neighbours = index.k_nearest(point, k).map_err(PipelineError::model)?;
            for (_, idx) in &neighbours {
                proba[(row, train_y[*idx])] += 1.0;
            }
            proba.row_mut(row).mapv_inplace(|v| v / neighbours.len() as f64);
        }
        Ok(proba)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(KNeighborsClassifier::new(self.k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn votes_follow_nearest_points() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [9.0, 9.0], [9.0, 8.0]];
        let y = array![0, 0, 0, 1, 1];
        let mut knn = KNeighborsClassifier::new(3);
        knn.fit(&x, &y).unwrap();

        let proba = knn.predict_proba(&array![[0.1, 0.1], [8.9, 8.9]]).unwrap();
        assert!((proba[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((proba[(1, 1)] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            knn.predict(&array![[0.1, 0.1], [8.9, 8.9]]).unwrap(),
            array![0, 1]
        );
    }

    #[test]
    fn k_is_capped_by_training_size() {
        let mut knn = KNeighborsClassifier::new(5);
        knn.fit(&array![[0.0], [1.0]], &array![1, 1]).unwrap();
        assert_eq!(knn.predict(&array![[0.5]]).unwrap(), array![1]);
    }
}
