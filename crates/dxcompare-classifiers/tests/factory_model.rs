use dxcompare_classifiers::config::{
    default_classifiers, default_stacking, default_voting, ModelSpec, ModelType,
};
use dxcompare_classifiers::models::factory;
use ndarray::{Array1, Array2};

/// Three loose clusters along the diagonal, 10 rows each.
fn clusters() -> (Array2<f64>, Array1<usize>) {
    let x = Array2::from_shape_fn((30, 2), |(r, c)| {
        let class = (r / 10) as f64;
        let jitter = ((r * 7 + c * 3) % 5) as f64 * 0.1;
        class * 4.0 + jitter
    });
    let y = Array1::from_shape_fn(30, |r| r / 10);
    (x, y)
}

#[test]
fn test_factory_builds_and_predicts() {
    let (x, y) = clusters();
    let mut specs = default_classifiers();
    specs.push(default_voting());
    specs.push(default_stacking());

    for mut named in factory::build_all(&specs) {
        named
            .model
            .fit(&x, &y)
            .unwrap_or_else(|e| panic!("{} failed to fit: {}", named.name, e));
        let pred = named.model.predict(&x).unwrap();
        assert_eq!(pred.len(), x.nrows(), "{}", named.name);
        assert!(pred.iter().all(|l| *l < 3), "{}", named.name);

        let proba = named.model.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (30, 3), "{}", named.name);
    }
}

#[test]
fn test_fresh_copy_is_unfitted() {
    let (x, y) = clusters();
    let mut named = factory::build_named(&ModelSpec::of(ModelType::KNeighbors { k: 3 }));
    named.model.fit(&x, &y).unwrap();
    let copy = named.fresh();
    assert_eq!(copy.name, "K Neighbors");
    assert!(copy.model.predict(&x).is_err());
    assert_eq!(named.model.predict(&x).unwrap(), y);
}
