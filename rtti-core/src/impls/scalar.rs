macro_rules! impl_pods {
    ($($ty:ty),* $(,)?) => {
        $( crate::reflect!(pod $ty); )*
    };
}

impl_pods!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);
