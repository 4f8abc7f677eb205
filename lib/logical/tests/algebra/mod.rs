mod explain;
mod extension;
mod test_utils;
mod variables;
