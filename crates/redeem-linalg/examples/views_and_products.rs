use redeem_linalg::{LinalgConfig, LinalgError, Matrix, Vector};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = LinalgConfig::default();

    let m = Matrix::from_rows(&[[2.0, 0.0, 1.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]])?;
    println!("m =\n{}", m);
    println!("upper triangular: {}", m.is_upper_triangular(config.tolerance));

    // Scale the middle row in place through a view.
    let row = m.row_view(1)?;
    row.scalar_mul_into(&row, 0.5)?;
    println!("row 1 after scaling: {}", row);
    println!("live views on m: {}", m.live_view_count());
    // Release errors hand the container back and are not Send; keep only the cause.
    row.release().map_err(LinalgError::from)?;

    let x = Vector::linspace(3, 1.0, 3.0)?;
    let y = m.vector_mul(&x)?;
    println!("m * {} = {}", x, y);

    let mut mt = m.copy()?;
    mt.transpose()?;
    let gram = mt.mul(&m)?;
    println!("m^T m =\n{}", gram.render_with(&config));

    m.release().map_err(LinalgError::from)?;
    Ok(())
}
