use glam::{Mat4, Vec3, Vec4};

/// Reflects `incident` about `normal` and returns the unit reflection vector.
///
/// `incident` points from the light source toward the surface point; both
/// inputs must be unit length. Degenerate inputs produce a degenerate result
/// rather than an error.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    // Work with the direction pointing away from the surface.
    let l = -incident;
    let cos_theta = l.dot(normal);
    (2.0 * cos_theta * normal - l).normalize()
}

/// Builds a right-handed perspective projection mapping depth to `[-1, 1]`.
///
/// `fovy` is the vertical field of view in radians. `z_far != z_near`,
/// `aspect != 0` and `fovy` in `(0, pi)` are caller obligations; violating
/// them yields a degenerate matrix.
pub fn perspective(fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    let y_scale = 1.0 / (fovy / 2.0).tan();
    let x_scale = y_scale / aspect;
    let depth = z_far - z_near;

    Mat4::from_cols(
        Vec4::new(x_scale, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y_scale, 0.0, 0.0),
        Vec4::new(0.0, 0.0, -(z_far + z_near) / depth, -1.0),
        Vec4::new(0.0, 0.0, -2.0 * z_far * z_near / depth, 0.0),
    )
}

/// Builds an orthographic projection for the given box, depth to `[-1, 1]`.
pub fn orthographic(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    z_near: f32,
    z_far: f32,
) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(2.0 / (right - left), 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / (top - bottom), 0.0, 0.0),
        Vec4::new(0.0, 0.0, -2.0 / (z_far - z_near), 0.0),
        Vec4::new(
            -(right + left) / (right - left),
            -(top + bottom) / (top - bottom),
            -(z_far + z_near) / (z_far - z_near),
            1.0,
        ),
    )
}

/// Builds a right-handed view matrix looking from `eye` toward `center`.
///
/// `up` must not be parallel to `center - eye`; the basis degenerates
/// otherwise (documented precondition, not checked).
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    // Camera basis: n is the forward direction (camera -Z), u the right
    // axis, v the true up recomputed from the other two.
    let n = (center - eye).normalize();
    let u = n.cross(up).normalize();
    let v = u.cross(n);

    // Rotation into camera space combined with the -eye translation.
    Mat4::from_cols(
        Vec4::new(u.x, v.x, -n.x, 0.0),
        Vec4::new(u.y, v.y, -n.y, 0.0),
        Vec4::new(u.z, v.z, -n.z, 0.0),
        Vec4::new(-u.dot(eye), -v.dot(eye), n.dot(eye), 1.0),
    )
}
