pub(crate) mod bootstrap;
pub(crate) mod gameplay;
pub(crate) mod loop_runner;
pub(crate) mod puzzle;
pub(crate) mod splash;

#[cfg(test)]
pub(crate) mod test_support;
