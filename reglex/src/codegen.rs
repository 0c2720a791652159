use std::fmt::Write as _;

use automata::ByteClass;

use crate::pipeline::CompiledParser;
use crate::spec::SpecFile;

const RUNTIME_TEMPLATE: &str = include_str!("../templates/runtime.rs.tmpl");

/// Emit the final output file: host prologue, the runtime template spliced
/// with the per-parser tables/actions this spec compiles to, host epilogue.
pub fn generate(spec: &SpecFile, compiled: &[CompiledParser]) -> String {
    let mut out = String::new();

    out.push_str(&String::from_utf8_lossy(&spec.host_prologue));
    out.push('\n');

    let mut body = RUNTIME_TEMPLATE.to_string();
    body = body.replace("#REGLEX_DECLARATIONS", &declarations(compiled));
    body = body.replace("#REGLEX_PARSER_SWITCHING", &parser_switching(compiled));
    body = body.replace("#REGLEX_REJECT_FNS", &reject_fns(compiled));
    body = body.replace("#REGLEX_REJECT_DISPATCH", &reject_dispatch(compiled));
    body = body.replace("#REGLEX_MAIN", &main_stub(spec));
    out.push_str(&body);

    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&spec.host_epilogue));

    out
}

fn variant_name(parser: &CompiledParser) -> String {
    match parser.name {
        None => "Default".to_string(),
        Some(name) => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Default".to_string(),
            }
        }
    }
}

fn fn_suffix(parser: &CompiledParser) -> &str {
    parser.name.unwrap_or("default")
}

/// The `ParserId` enum plus one pair of free functions per parser encoding
/// its minimal DFA as a table/switch: `step_<name>` for transitions,
/// `accept_tag_<name>` for which states are accepting and with what tag.
fn declarations(compiled: &[CompiledParser]) -> String {
    let mut out = String::new();

    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\npub enum ParserId {\n");
    for parser in compiled {
        let _ = writeln!(out, "    {},", variant_name(parser));
    }
    out.push_str("}\n\n");

    out.push_str("impl ParserId {\n");
    let default = compiled.iter().find(|p| p.is_default).unwrap_or(&compiled[0]);
    let _ = writeln!(
        out,
        "    fn default_parser() -> Self {{ ParserId::{} }}\n",
        variant_name(default)
    );

    out.push_str("    fn initial_state(self) -> usize {\n        match self {\n");
    for parser in compiled {
        let _ = writeln!(
            out,
            "            ParserId::{} => {},",
            variant_name(parser),
            parser.dfa.initial_state
        );
    }
    out.push_str("        }\n    }\n\n");

    out.push_str("    fn step(self, state: usize, byte: u8) -> Option<usize> {\n        match self {\n");
    for parser in compiled {
        let _ = writeln!(
            out,
            "            ParserId::{} => {}(state, byte),",
            variant_name(parser),
            step_fn_name(parser)
        );
    }
    out.push_str("        }\n    }\n\n");

    out.push_str("    fn accept_tag(self, state: usize) -> Option<u32> {\n        match self {\n");
    for parser in compiled {
        let _ = writeln!(
            out,
            "            ParserId::{} => {}(state),",
            variant_name(parser),
            accept_tag_fn_name(parser)
        );
    }
    out.push_str("        }\n    }\n}\n\n");

    for parser in compiled {
        out.push_str(&step_table(parser));
        out.push('\n');
        out.push_str(&accept_table(parser));
        out.push('\n');
    }

    out
}

fn step_fn_name(parser: &CompiledParser) -> String {
    format!("step_{}", fn_suffix(parser))
}

fn accept_tag_fn_name(parser: &CompiledParser) -> String {
    format!("accept_tag_{}", fn_suffix(parser))
}

fn step_table(parser: &CompiledParser) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "fn {}(state: usize, byte: u8) -> Option<usize> {{",
        step_fn_name(parser)
    );
    out.push_str("    match state {\n");
    for state in 0..parser.dfa.total_states {
        let mut arms = parser
            .dfa
            .transition
            .transitions_from(state)
            .flat_map(|(label, dst)| {
                label
                    .ranges()
                    .into_iter()
                    .map(move |(start, end)| (start, end, dst))
            })
            .peekable();
        if arms.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "        {} => match byte {{", state);
        for (start, end, dst) in arms {
            let _ = writeln!(out, "            {}..={} => Some({}),", start, end, dst);
        }
        out.push_str("            _ => None,\n        },\n");
    }
    out.push_str("        _ => None,\n    }\n}\n");
    out
}

fn accept_table(parser: &CompiledParser) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "fn {}(state: usize) -> Option<u32> {{",
        accept_tag_fn_name(parser)
    );
    out.push_str("    match state {\n");
    let mut accepting: Vec<(usize, u32)> = (0..parser.dfa.total_states)
        .filter_map(|s| parser.dfa.end_tag(s).map(|tag| (s, tag)))
        .collect();
    accepting.sort_by_key(|(s, _)| *s);
    for (state, tag) in accepting {
        let _ = writeln!(out, "        {} => Some({}),", state, tag);
    }
    out.push_str("        _ => None,\n    }\n}\n");
    out
}

fn parser_switching(compiled: &[CompiledParser]) -> String {
    let named: Vec<&CompiledParser> = compiled.iter().filter(|p| p.name.is_some()).collect();

    let mut out = String::new();
    out.push_str("    /// Switches the active sub-lexer to the one named `name`;\n");
    out.push_str("    /// returns whether `name` was recognized.\n");
    out.push_str("    pub fn switch_parser(&mut self, name: &str) -> bool {\n");
    out.push_str("        match name {\n");
    for parser in &named {
        let _ = writeln!(
            out,
            "            {:?} => {{ self.current = ParserId::{}; true }}",
            parser.name.unwrap(),
            variant_name(parser)
        );
    }
    out.push_str("            _ => false,\n        }\n    }\n");
    out
}

fn reject_fns(compiled: &[CompiledParser]) -> String {
    let mut out = String::new();
    for parser in compiled {
        let _ = writeln!(out, "    fn reject_{}(&mut self) {{", fn_suffix(parser));
        out.push_str("        match self.checkpoint_tag {\n");
        for rule in parser.rules {
            let _ = writeln!(out, "            Some({}) => {{", rule.tag);
            out.push_str(&String::from_utf8_lossy(&rule.action));
            out.push_str("\n            }\n");
        }
        out.push_str("            _ => {\n");
        out.push_str("                if self.lookahead.is_empty() {\n");
        out.push_str("                    self.parse_result = Some(ParseResult::EofClean);\n");
        out.push_str("                } else {\n");
        out.push_str("                    self.parse_result = Some(ParseResult::Error);\n");
        out.push_str("                }\n            }\n        }\n");
        out.push_str("        self.reset_to_checkpoint();\n    }\n\n");
    }
    out
}

fn reject_dispatch(compiled: &[CompiledParser]) -> String {
    let mut out = String::new();
    for parser in compiled {
        let _ = writeln!(
            out,
            "            ParserId::{} => self.reject_{}(),",
            variant_name(parser),
            fn_suffix(parser)
        );
    }
    out
}

fn main_stub(spec: &SpecFile) -> String {
    if !spec.emit_main {
        return String::new();
    }
    "fn main() {\n    let mut lexer = Lexer::new(std::io::stdin());\n    std::process::exit(match lexer.parse() {\n        ParseResult::EofClean => 0,\n        ParseResult::Error => 1,\n    });\n}\n"
        .to_string()
}
