pub mod dates;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod patch;

#[cfg(test)]
pub mod test_db;
