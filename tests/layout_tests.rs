//! Struct layout through the full checker pipeline: declarations go in,
//! laid-out types come out of the registry.

mod common;

use arden::types::Type;
use common::*;

#[test]
fn packed_file_header_layout() {
    let mut ctx = Ctx::new();
    let mut module = module();
    module.add(native_struct_decl(
        &mut ctx,
        "FileHeader",
        vec![
            ("magic", Type::INT32),
            ("version", Type::BYTE),
            ("flags", Type::BYTE),
            ("size", Type::INT32),
        ],
        true,
    ));
    assert!(ctx.check(&mut module), "{:?}", ctx.messages());

    let ty = registered(&ctx, "FileHeader");
    let st = ty.as_struct().unwrap();
    let offsets: Vec<usize> = st.fields.iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 4, 5, 6]);
    assert_eq!(st.size, 10);
    assert_eq!(st.alignment, 1);
}

#[test]
fn non_packed_mixed_widths() {
    let mut ctx = Ctx::new();
    let mut module = module();
    module.add(struct_decl(
        &mut ctx,
        "Test",
        vec![("a", Type::INT32), ("b", Type::INT)],
    ));
    assert!(ctx.check(&mut module), "{:?}", ctx.messages());

    let ty = registered(&ctx, "Test");
    let st = ty.as_struct().unwrap();
    assert_eq!(st.fields[0].offset, 0);
    assert_eq!(st.fields[1].offset, 8);
    assert_eq!(st.size, 16);
    assert_eq!(st.alignment, 8);
}

#[test]
fn nested_struct_layout_through_registry() {
    let mut ctx = Ctx::new();
    let point = ctx.sym("Point");
    let mut module = module();
    module.add(struct_decl(
        &mut ctx,
        "Point",
        vec![("x", Type::DOUBLE), ("y", Type::DOUBLE)],
    ));
    module.add(struct_decl(
        &mut ctx,
        "Rect",
        vec![
            ("origin", Type::Named(point)),
            ("w", Type::INT32),
            ("h", Type::INT32),
        ],
    ));
    assert!(ctx.check(&mut module), "{:?}", ctx.messages());

    let rect = registered(&ctx, "Rect");
    let st = rect.as_struct().unwrap();
    assert_eq!(st.fields[0].offset, 0);
    assert_eq!(st.fields[1].offset, 16);
    assert_eq!(st.fields[2].offset, 20);
    assert_eq!(st.size, 24);
    assert_eq!(st.alignment, 8);
}

#[test]
fn layout_size_is_multiple_of_alignment() {
    let samples: Vec<Vec<(&str, Type)>> = vec![
        vec![("a", Type::BYTE)],
        vec![("a", Type::BOOL), ("b", Type::DOUBLE)],
        vec![("a", Type::INT32), ("b", Type::BYTE)],
        vec![("a", Type::STR), ("b", Type::CHAR), ("c", Type::FLOAT)],
        vec![("a", Type::LONG), ("b", Type::UINT32), ("c", Type::BYTE)],
    ];
    for (i, fields) in samples.into_iter().enumerate() {
        let mut ctx = Ctx::new();
        let mut m = module();
        let name = format!("Sample{i}");
        let stmt = struct_decl(&mut ctx, &name, fields);
        m.add(stmt);
        assert!(ctx.check(&mut m), "{:?}", ctx.messages());
        let ty = registered(&ctx, &name);
        let st = ty.as_struct().unwrap();
        assert!(st.alignment >= 1);
        assert_eq!(st.size % st.alignment, 0, "sample {i}");
    }
}

#[test]
fn packed_size_never_exceeds_unpacked() {
    let fields = vec![
        ("a", Type::BYTE),
        ("b", Type::INT),
        ("c", Type::INT32),
        ("d", Type::BYTE),
    ];
    let mut ctx = Ctx::new();
    let mut m = module();
    let plain = struct_decl(&mut ctx, "Plain", fields.clone());
    let packed = native_struct_decl(&mut ctx, "Packed", fields, true);
    m.add(plain);
    m.add(packed);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());

    let plain = registered(&ctx, "Plain");
    let packed = registered(&ctx, "Packed");
    let plain = plain.as_struct().unwrap();
    let packed = packed.as_struct().unwrap();
    assert!(packed.size <= plain.size);
    assert_eq!(packed.alignment, 1);
    // Packed fields touch: each offset is the previous end.
    assert_eq!(packed.fields[1].offset, 1);
    assert_eq!(packed.fields[2].offset, 9);
    assert_eq!(packed.fields[3].offset, 13);
    assert_eq!(packed.size, 14);
}

#[test]
fn empty_struct_layout() {
    let mut ctx = Ctx::new();
    let mut m = module();
    let stmt = struct_decl(&mut ctx, "Empty", vec![]);
    m.add(stmt);
    assert!(ctx.check(&mut m), "{:?}", ctx.messages());
    let ty = registered(&ctx, "Empty");
    let st = ty.as_struct().unwrap();
    assert_eq!(st.size, 0);
    assert_eq!(st.alignment, 1);
}
