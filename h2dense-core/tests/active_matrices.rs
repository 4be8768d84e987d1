use h2dense_core::{active_matrices, Mat};

// Runs in its own process, so no other test creates matrices concurrently.
#[test]
fn counter_tracks_owning_matrices() {
    let before = active_matrices();

    let a = Mat::<f64>::zeros(3, 4);
    let b = a.clone();
    assert_eq!(active_matrices(), before + 2);

    {
        let _view = a.as_ref().submatrix(1, 1, 2, 2);
        let _col = b.as_ref().col(0);
        assert_eq!(active_matrices(), before + 2);
    }

    drop(a);
    assert_eq!(active_matrices(), before + 1);
    drop(b);
    assert_eq!(active_matrices(), before);
}
