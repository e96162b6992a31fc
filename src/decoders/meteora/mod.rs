pub mod dlmm;
