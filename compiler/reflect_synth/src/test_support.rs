//! Parsing and rendering around a [`SynthContext`] for generator tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reflect_ir::{CompilationUnit, DeclId, ExprId, Renderer, StringInterner, SynthesizedDecl};

use crate::context::{SynthConfig, SynthContext};

pub(crate) struct Fixture {
    pub interner: StringInterner,
    pub unit: CompilationUnit,
}

impl Fixture {
    pub fn parse(source: &str) -> Self {
        let interner = StringInterner::new();
        let output = reflect_parse::parse("synth_test.kt", source, &interner);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        Fixture {
            interner,
            unit: output.unit,
        }
    }

    pub fn id(&self, name: &str) -> DeclId {
        let name = self.interner.get(name).unwrap();
        self.unit.decls.iter().find(|d| d.name == name).unwrap().id
    }

    pub fn run<T>(&mut self, f: impl FnOnce(&mut SynthContext<'_>) -> T) -> T {
        self.run_with(SynthConfig::default(), f)
    }

    pub fn run_with<T>(
        &mut self,
        config: SynthConfig,
        f: impl FnOnce(&mut SynthContext<'_>) -> T,
    ) -> T {
        let mut cx = SynthContext::new(
            &self.unit.decls,
            &self.unit.synthesized,
            &mut self.unit.arena,
            &self.interner,
            config,
        );
        f(&mut cx)
    }

    pub fn render(&self, decls: &[SynthesizedDecl]) -> Vec<String> {
        let renderer = Renderer::new(&self.interner, &self.unit.arena);
        decls.iter().map(|d| renderer.decl(&d.decl)).collect()
    }

    pub fn render_expr(&self, id: ExprId) -> String {
        Renderer::new(&self.interner, &self.unit.arena).expr(id)
    }
}
