//! Generates synthetic `.properties` files of specified line counts for benchmarking

pub fn generate_properties(target_lines: usize) -> String {
    let mut output = String::with_capacity(target_lines * 40);

    // Header with interpolation sources
    output.push_str("# Synthetic benchmark properties\n");
    output.push_str("base.host = localhost\n");
    output.push_str("base.port = 8080\n");
    output.push('\n');

    let mut lines = 4;
    let mut section = 0;

    while lines < target_lines {
        // A commented section header every ~20 lines
        output.push_str(&format!("# section {}\n", section));
        lines += 1;

        let entries = (target_lines - lines).clamp(1, 18);
        for i in 0..entries {
            if lines >= target_lines {
                break;
            }
            match i % 6 {
                0 => output.push_str(&format!("section.{}.int.{} = {}\n", section, i, i * 10)),
                1 => output.push_str(&format!("section.{}.float.{} = {:.2}\n", section, i, i as f64 * 0.5)),
                2 => output.push_str(&format!("section.{}.name.{} : value {}\n", section, i, i)),
                3 => output.push_str(&format!("#section.{}.disabled.{}=true\n", section, i)),
                4 => output.push_str(&format!(
                    "section.{}.url.{} = http://$(base.host):$(base.port)/{}\n",
                    section, i, i
                )),
                5 => output.push_str(&format!("section.{}.flag.{} = {}\n", section, i, i % 2 == 0)),
                _ => unreachable!(),
            }
            lines += 1;
        }

        // Blank line between sections
        if lines < target_lines {
            output.push('\n');
            lines += 1;
        }
        section += 1;
    }

    output
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::generate_properties;

    #[test]
    fn test_generate_small() {
        let text = generate_properties(50);
        let lines = text.lines().count();
        assert!((48..=52).contains(&lines), "Got {} lines", lines);
    }

    #[test]
    fn test_generate_large() {
        let text = generate_properties(1000);
        let lines = text.lines().count();
        assert!((998..=1002).contains(&lines), "Got {} lines", lines);
    }

    #[test]
    fn test_has_groups_and_hidden() {
        let text = generate_properties(100);
        assert!(text.contains("section.0.int.0"));
        assert!(text.contains("#section.0.disabled"));
    }
}
