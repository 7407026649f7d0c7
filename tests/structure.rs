use approx::assert_relative_eq;
use stablex::prelude::*;

#[test]
fn test_rectangle_section_properties() {
    let section = Section::rectangle(100.0, 150.0);
    assert_eq!(section.area(), 15000.0);
    assert_eq!(section.inertia(), 28125000.0);
    assert_relative_eq!(section.radius_of_gyration(), (28125000.0_f64 / 15000.0).sqrt());
}

#[test]
fn test_length_follows_node_coordinates() {
    let mut structure = Structure::new();
    let a = structure.add_node(1.0, 1.0);
    let b = structure.add_node(2.0, 2.0);
    let id = structure
        .add_element(Element::frame(a, b, Section::rectangle(10.0, 10.0)))
        .unwrap();
    let length = |s: &Structure| s.element(id).unwrap().length(s).unwrap();
    assert_relative_eq!(length(&structure), 2.0_f64.sqrt());

    structure.node_mut(b).unwrap().y = 1.0;
    assert_relative_eq!(length(&structure), 1.0);

    structure.reset_coordinates();
    assert_relative_eq!(length(&structure), 2.0_f64.sqrt());
}

#[test]
fn test_dof_catalogue_partition() {
    let mut structure = Structure::new();
    let a = structure.add_node(0.0, 0.0);
    let b = structure.add_node(3000.0, 0.0);
    let c = structure.add_node(6000.0, 0.0);
    let section = Section::rectangle(100.0, 150.0);
    structure.add_element(Element::frame(a, b, section)).unwrap();
    structure.add_element(Element::truss(b, c, section)).unwrap();
    structure.restrain(a, Direction::Y).unwrap();
    structure.restrain(c, Direction::X).unwrap();
    structure.restrain(c, Direction::Y).unwrap();

    let all = structure.degrees_of_freedom().unwrap();
    let free = structure.free_degrees_of_freedom().unwrap();
    let restrained = structure.restrained_degrees_of_freedom().unwrap();

    // truss end c has no rotational DOF in the catalogue
    assert_eq!(all.len(), 8);
    assert_eq!(free.len() + restrained.len(), all.len());
    assert_eq!(&all[..free.len()], free.as_slice());
    assert_eq!(&all[free.len()..], restrained.as_slice());
    assert!(free.windows(2).all(|w| w[0] < w[1]));
    assert!(restrained.windows(2).all(|w| w[0] < w[1]));
    assert!(!all.contains(&structure.node(c).unwrap().rz_dof()));
}

#[test]
fn test_aliased_dof_is_shared_and_listed_once() {
    let mut structure = Structure::new();
    let a = structure.add_node(0.0, 0.0);
    let b = structure.add_node(0.0, 3000.0);
    let c = structure.add_node(0.0, 3000.0);
    let d = structure.add_node(4000.0, 3000.0);
    let section = Section::rectangle(100.0, 150.0);
    structure.add_element(Element::frame(a, b, section)).unwrap();
    structure.add_element(Element::frame(c, d, section)).unwrap();

    let before = structure.degrees_of_freedom().unwrap().len();
    structure.couple(c, b, Direction::X).unwrap();
    structure.couple(c, b, Direction::Y).unwrap();
    assert_eq!(structure.degrees_of_freedom().unwrap().len(), before - 2);

    let shared = structure.node(b).unwrap().x_dof();
    assert_eq!(structure.node(c).unwrap().x_dof(), shared);
    structure.dof_mut(shared).unwrap().restrained = true;
    assert!(structure
        .restrained_degrees_of_freedom()
        .unwrap()
        .contains(&structure.node(c).unwrap().x_dof()));

    let catalogue = structure.degrees_of_freedom().unwrap();
    assert_eq!(catalogue.iter().filter(|&&id| id == shared).count(), 1);
}

#[test]
fn test_nodes_have_set_semantics() {
    let mut structure = Structure::new();
    let a = structure.add_node(0.0, 0.0);
    let b = structure.add_node(1000.0, 0.0);
    let section = Section::rectangle(10.0, 10.0);
    structure.add_element(Element::frame(a, b, section)).unwrap();
    structure.add_element(Element::truss(b, a, section)).unwrap();
    structure
        .add_element(Element::rotational_spring(a, a, 10.0).unwrap())
        .unwrap();
    assert_eq!(structure.nodes(), vec![a, b]);
}

#[test]
fn test_lookup_errors() {
    let mut other = Structure::new();
    let foreign = other.add_node(0.0, 0.0);
    other.add_node(1.0, 0.0);
    let far = other.add_node(2.0, 0.0);

    let mut structure = Structure::new();
    let a = structure.add_node(0.0, 0.0);
    assert!(matches!(structure.node(far), Err(FEAError::NodeNotFound(_))));
    assert!(structure.node(foreign).is_ok());
    assert!(matches!(
        structure.add_element(Element::truss(a, far, Section::rectangle(1.0, 1.0))),
        Err(FEAError::NodeNotFound(_))
    ));
    assert!(matches!(
        structure.set_force(far, Direction::X, 1.0),
        Err(FEAError::NodeNotFound(_))
    ));
}
