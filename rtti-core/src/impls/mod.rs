mod void;

mod scalar;
mod string;

mod option;
mod vec;

mod hashmap;
