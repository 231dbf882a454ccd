pub fn default_true() -> bool {
    true
}
