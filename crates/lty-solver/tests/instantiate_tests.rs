use super::*;
use crate::union;

fn t() -> Atom {
    Atom::new("T")
}

#[test]
fn substitution_basics() {
    let mut subst = TypeSubstitution::new();
    assert!(subst.is_empty());
    subst.insert(t(), Ty::String);
    assert_eq!(subst.get(&t()), Some(&Ty::String));
    assert_eq!(subst.get(&Atom::new("U")), None);
    assert_eq!(subst.len(), 1);
}

#[test]
fn from_args_binds_positionally() {
    let subst = TypeSubstitution::from_args(&[t(), Atom::new("U")], &[Ty::Number]);
    assert_eq!(subst.get(&t()), Some(&Ty::Number));
    assert_eq!(subst.get(&Atom::new("U")), Some(&Ty::Unknown));
}

#[test]
fn instantiates_inside_functions_and_arrays() {
    let id = Ty::function(vec![Ty::generic("T")], Ty::array(Ty::generic("T")), false);
    let mut subst = TypeSubstitution::new();
    subst.insert(t(), Ty::Number);
    let expected = Ty::function(vec![Ty::Number], Ty::array(Ty::Number), false);
    assert_eq!(instantiate_type(&id, &subst), expected);
}

#[test]
fn instantiated_unions_are_renormalized() {
    let optional = union(&Ty::generic("T"), &Ty::Nil);
    let mut subst = TypeSubstitution::new();
    subst.insert(t(), Ty::Nil);
    assert_eq!(instantiate_type(&optional, &subst), Ty::Nil);

    subst.insert(t(), union(&Ty::Number, &Ty::Nil));
    assert_eq!(
        instantiate_type(&optional, &subst),
        union(&Ty::Number, &Ty::Nil)
    );
}

#[test]
fn instantiates_class_members() {
    let boxed = Ty::class(ClassType::anonymous().with_member("value", Ty::generic("T")));
    let mut subst = TypeSubstitution::new();
    subst.insert(t(), Ty::String);
    let result = instantiate_type(&boxed, &subst);
    let class = result.as_class().expect("class");
    assert_eq!(class.member("value").map(|m| m.ty.clone()), Some(Ty::String));
}

#[test]
fn unbound_generics_and_primitives_are_untouched() {
    let mut subst = TypeSubstitution::new();
    subst.insert(Atom::new("U"), Ty::Number);
    assert_eq!(instantiate_type(&Ty::generic("T"), &subst), Ty::generic("T"));
    assert_eq!(instantiate_type(&Ty::Boolean, &subst), Ty::Boolean);
}

#[test]
fn erase_replaces_every_generic() {
    let ty = Ty::function(vec![Ty::generic("T")], Ty::generic("U"), false);
    assert_eq!(
        erase_generics(&ty),
        Ty::function(vec![Ty::Unknown], Ty::Unknown, false)
    );
}

#[test]
fn fingerprint_ignores_insertion_order() {
    let mut a = TypeSubstitution::new();
    a.insert(t(), Ty::Number);
    a.insert(Atom::new("U"), Ty::String);
    let mut b = TypeSubstitution::new();
    b.insert(Atom::new("U"), Ty::String);
    b.insert(t(), Ty::Number);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(TypeSubstitution::new().fingerprint(), 0);

    b.insert(t(), Ty::Boolean);
    assert_ne!(a.fingerprint(), b.fingerprint());
}
