use super::{float_in, node, out, transform_in, transform_out, vector_in};
use crate::model::graph::SocketType;
use crate::nodes::node_types::{NodeCategory, NodeTypeDefinition, type_ids};

pub(super) fn transform_nodes() -> Vec<NodeTypeDefinition> {
    use SocketType::*;
    let nc = NodeCategory::Transform;
    vec![
        // --- Construction: incoming transform * new transform ---
        node(type_ids::TRANSLATION_TRANSFORM, "Translation Transform", nc)
            .with_description("Create translation from a vector")
            .with_inputs(vec![transform_in(), vector_in("Vector", 0.0, 0.0, 0.0)])
            .with_outputs(vec![transform_out()]),
        node(type_ids::EULER_TRANSFORM, "Euler Transform", nc)
            .with_description("Create rotation from Euler angles")
            .with_inputs(vec![transform_in(), vector_in("Euler Angles", 0.0, 0.0, 0.0)])
            .with_outputs(vec![transform_out()])
            .with_property("euler_order", "XYZ"),
        node(type_ids::AXIS_ANGLE_TRANSFORM, "Axis/Angle Transform", nc)
            .with_description("Create rotation from axis and angle")
            .with_inputs(vec![
                transform_in(),
                vector_in("Axis", 0.0, 0.0, 1.0),
                float_in("Angle"),
            ])
            .with_outputs(vec![transform_out()]),
        node(type_ids::SCALE_TRANSFORM, "Scale Transform", nc)
            .with_description("Create transform from a scaling vector")
            .with_inputs(vec![transform_in(), vector_in("Scale", 1.0, 1.0, 1.0)])
            .with_outputs(vec![transform_out()]),
        // --- Decomposition ---
        node(type_ids::GET_TRANSLATION, "Get Translation", nc)
            .with_description("Get translation vector from a transform")
            .with_inputs(vec![transform_in()])
            .with_outputs(vec![out("Vector", Vector)]),
        node(type_ids::GET_EULER, "Get Euler Angles", nc)
            .with_description("Get euler angles from a transform")
            .with_inputs(vec![transform_in()])
            .with_outputs(vec![out("Euler Angles", Vector)])
            .with_property("euler_order", "XYZ"),
        node(type_ids::GET_AXIS_ANGLE, "Get Axis/Angle", nc)
            .with_description("Get axis and angle from a transform")
            .with_inputs(vec![transform_in()])
            .with_outputs(vec![out("Axis", Vector), out("Angle", Float)]),
        node(type_ids::GET_SCALE, "Get Scale", nc)
            .with_description("Get scale from a transform")
            .with_inputs(vec![transform_in()])
            .with_outputs(vec![out("Scale", Vector)]),
    ]
}
