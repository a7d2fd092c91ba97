/// Primitive number types at least 4 bytes aligned.
///
/// Receive buffers made of these types can be reinterpreted as `f32` payloads without copying.
pub trait Align4: bytemuck::Pod {}

impl Align4 for u32 {}
impl Align4 for i32 {}
impl Align4 for u64 {}
impl Align4 for i64 {}
impl Align4 for u128 {}
impl Align4 for i128 {}
impl Align4 for f32 {}
impl Align4 for f64 {}
