//! Locating the deepest element whose text range contains a given byte
//! offset into a message's value.

use std::fmt;

use crate::element::Element;

/// The result of [`crate::Message::locate`]: the chain of elements, from
/// segment down to subcomponent, whose ranges contain the queried offset.
/// Levels past the deepest containing element are `None` — e.g. an offset
/// that falls on a field but whose field has no further subdivision still
/// leaves `repetition`/`component`/`subcomponent` populated (every field has
/// at least one repetition, every repetition at least one component, and so
/// on), but an offset past the end of the message leaves every field `None`.
#[derive(Debug, Clone)]
pub struct LocatedElement {
    pub segment: Option<Element>,
    pub field: Option<Element>,
    pub repetition: Option<Element>,
    pub component: Option<Element>,
    pub subcomponent: Option<Element>,
}

impl LocatedElement {
    fn empty() -> Self {
        LocatedElement {
            segment: None,
            field: None,
            repetition: None,
            component: None,
            subcomponent: None,
        }
    }

    /// The deepest element found, i.e. the last non-`None` field in
    /// descent order.
    pub fn deepest(&self) -> Option<&Element> {
        self.subcomponent
            .as_ref()
            .or(self.component.as_ref())
            .or(self.repetition.as_ref())
            .or(self.field.as_ref())
            .or(self.segment.as_ref())
    }
}

/// Include the delimiter on either side of a division in the containment
/// check, so that the cursor sitting exactly on a separator resolves to the
/// division on either side of it rather than falling through to nothing.
fn contains(element: &Element, offset: usize) -> bool {
    let range = element.range();
    offset >= range.start && offset <= range.end
}

/// How many segments of `segment`'s type precede (and include) it among its
/// message's segments, 1-based, alongside the total count of that type.
fn segment_repeat_index(segment: &Element) -> (usize, usize) {
    let root = segment
        .ancestor()
        .expect("a located segment always has a message ancestor");
    let seg_type = segment.get(0).value();
    let mut index = 0;
    let mut count = 0;
    for candidate in root.descendant_elements() {
        if candidate.get(0).value() == seg_type {
            count += 1;
            if candidate.key() == segment.key() {
                index = count;
            }
        }
    }
    (index, count)
}

impl fmt::Display for LocatedElement {
    /// Renders a dotted path such as `PID.5.1` or, for a repeated segment
    /// type, `IN2[2].4`. Repetition/component/subcomponent indices are shown
    /// only when their parent actually has more than one of them, matching
    /// how a compact HL7 path is conventionally written.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(segment) = &self.segment else {
            return Ok(());
        };
        write!(f, "{}", segment.get(0).value())?;
        let (index, count) = segment_repeat_index(segment);
        if count > 1 {
            write!(f, "[{index}]")?;
        }

        let Some(field) = &self.field else {
            return Ok(());
        };
        let field_number = field.key().last().expect("a field always has a key").1;
        write!(f, ".{field_number}")?;

        let Some(repetition) = &self.repetition else {
            return Ok(());
        };
        if field.descendant_count() > 1 {
            let rep_number = repetition.key().last().expect("a repetition always has a key").1 + 1;
            write!(f, "[{rep_number}]")?;
        }

        let Some(component) = &self.component else {
            return Ok(());
        };
        if repetition.descendant_count() > 1 {
            let comp_number = component.key().last().expect("a component always has a key").1 + 1;
            write!(f, ".{comp_number}")?;
        }

        let Some(subcomponent) = &self.subcomponent else {
            return Ok(());
        };
        if component.descendant_count() > 1 {
            let sub_number = subcomponent.key().last().expect("a subcomponent always has a key").1 + 1;
            write!(f, ".{sub_number}")?;
        }

        Ok(())
    }
}

/// Walk from `root` (a message) down to the deepest element whose range
/// contains `offset`, a byte offset into `root.value()`. Returns `None` if
/// the offset doesn't fall within any segment at all (e.g. it's past the
/// end of the message).
pub fn locate(root: &Element, offset: usize) -> Option<LocatedElement> {
    if offset > root.range().end {
        return None;
    }
    let mut result = LocatedElement::empty();

    let segment = root
        .descendant_elements()
        .into_iter()
        .find(|seg| contains(seg, offset))?;
    result.segment = Some(segment.clone());

    let field = segment
        .descendant_elements()
        .into_iter()
        .find(|f| contains(f, offset));
    let field = match field {
        Some(f) => f,
        None => return Some(result),
    };
    result.field = Some(field.clone());

    let repetition = field
        .descendant_elements()
        .into_iter()
        .find(|r| contains(r, offset));
    let repetition = match repetition {
        Some(r) => r,
        None => return Some(result),
    };
    result.repetition = Some(repetition.clone());

    let component = repetition
        .descendant_elements()
        .into_iter()
        .find(|c| contains(c, offset));
    let component = match component {
        Some(c) => c,
        None => return Some(result),
    };
    result.component = Some(component.clone());

    let subcomponent = component
        .descendant_elements()
        .into_iter()
        .find(|s| contains(s, offset));
    result.subcomponent = subcomponent;

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn locates_a_field_by_offset() {
        let m = Message::new("MSH|^~\\&|\rPID|a|b^c").unwrap();
        // "MSH|^~\&|\rPID|a|b^c"
        //  0123456789 0123456789
        // offset 15 = 'b' inside PID.3's first component
        let offset = m.value().find('b').unwrap();
        let located = locate(m.root(), offset).unwrap();
        assert_eq!(located.segment.unwrap().get(0).value(), "PID");
        assert_eq!(located.field.unwrap().value(), "b^c");
        assert_eq!(located.component.unwrap().value(), "b");
    }

    #[test]
    fn locates_header_pseudo_fields() {
        let m = Message::new("MSH|^~\\&|APP").unwrap();
        let offset = m.value().find("APP").unwrap();
        let located = locate(m.root(), offset).unwrap();
        assert_eq!(located.field.unwrap().value(), "APP");
    }

    #[test]
    fn out_of_range_offset_returns_none() {
        let m = Message::new("MSH|^~\\&|").unwrap();
        assert!(locate(m.root(), 10_000).is_none());
    }

    #[test]
    fn display_renders_a_dotted_path() {
        let m = Message::new("MSH|^~\\&|\rPID|a|b^c").unwrap();
        let offset = m.value().find('b').unwrap();
        let located = locate(m.root(), offset).unwrap();
        assert_eq!(located.to_string(), "PID.3.1");
    }

    #[test]
    fn display_brackets_a_repeated_segment_type() {
        let m = Message::new("MSH|^~\\&|\rIN2|a\rIN2|w|x|y|d").unwrap();
        let offset = m.value().rfind('d').unwrap();
        let located = locate(m.root(), offset).unwrap();
        assert_eq!(located.to_string(), "IN2[2].4");
    }
}
