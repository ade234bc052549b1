//! What the user asked for, read off annotations.

use bitflags::bitflags;

use reflect_ir::{Declaration, Name};

bitflags! {
    /// Generators requested for one class-like declaration.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Request: u8 {
        /// `getX()` per member.
        const ACCESSORS = 1 << 0;
        /// `product()` listing `(name, value)` pairs.
        const DESCRIPTOR = 1 << 1;
        /// Lenses and traversals.
        const OPTICS = 1 << 2;
        /// A default-valued `tSample` property.
        const SAMPLE = 1 << 3;
    }
}

impl Request {
    /// Generators that follow the shape into variants.
    pub const STRUCTURAL: Request = Request::ACCESSORS
        .union(Request::DESCRIPTOR)
        .union(Request::OPTICS);

    /// `@Reflect` → accessors and descriptor, `@Product` → descriptor,
    /// `@Optics` → optics, `@Sample` → sample.
    pub fn from_annotations(decl: &Declaration) -> Request {
        let mut request = Request::empty();
        for annotation in &decl.annotations {
            request |= match annotation.name {
                Name::REFLECT => Request::ACCESSORS | Request::DESCRIPTOR,
                Name::PRODUCT => Request::DESCRIPTOR,
                Name::OPTICS => Request::OPTICS,
                Name::SAMPLE => Request::SAMPLE,
                _ => Request::empty(),
            };
        }
        request
    }

    /// Label for diagnostics.
    pub fn describe(self) -> &'static str {
        if self.contains(Request::ACCESSORS) {
            "reflection"
        } else if self.contains(Request::DESCRIPTOR) {
            "a product descriptor"
        } else if self.contains(Request::OPTICS) {
            "optics"
        } else if self.contains(Request::SAMPLE) {
            "a sample"
        } else {
            "nothing"
        }
    }
}

#[cfg(test)]
mod tests {
    use reflect_ir::{Annotation, DeclKind, Span};

    use super::*;

    #[test]
    fn annotations_map_to_generators() {
        let mut decl = Declaration::new(DeclKind::Class, Name::EMPTY, Span::DUMMY);
        assert_eq!(Request::from_annotations(&decl), Request::empty());

        decl.annotations = vec![
            Annotation::marker(Name::REFLECT, Span::DUMMY),
            Annotation::marker(Name::OPTICS, Span::DUMMY),
        ];
        assert_eq!(
            Request::from_annotations(&decl),
            Request::ACCESSORS | Request::DESCRIPTOR | Request::OPTICS
        );

        decl.annotations = vec![
            Annotation::marker(Name::PRODUCT, Span::DUMMY),
            Annotation::marker(Name::SAMPLE, Span::DUMMY),
        ];
        let request = Request::from_annotations(&decl);
        assert_eq!(request, Request::DESCRIPTOR | Request::SAMPLE);
        assert_eq!(request.describe(), "a product descriptor");
    }
}
