/// Print the binary name and the git revision it was built from, as JSON.
pub fn print_report(name: &str) {
    println!("{}", report(name));
}

pub fn report(name: &str) -> String {
    format!(
        "{{\n  \"name\": \"{}\",\n  \"version\": \"{}\",\n  \"git_describe\": \"{}\",\n  \"git_hash\": \"{}\",\n  \"mpi\": {}\n}}",
        name,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_DESCRIBE"),
        env!("GIT_HASH"),
        cfg!(feature = "mpi"),
    )
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn report_names_binary() {
        let report = report("heat_2d_serial");
        assert!(report.starts_with('{'));
        assert!(report.ends_with('}'));
        assert!(report.contains("\"name\": \"heat_2d_serial\""));
        assert!(report.contains("\"git_hash\""));
    }
}
