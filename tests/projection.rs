//! Writer/reader schema projection during decoding

use {
	avro_reflect::{Decoded, HostValue, Schema, Value},
	pretty_assertions::assert_eq,
};

#[test]
fn added_fields_take_their_default() -> anyhow::Result<()> {
	let writer: Schema = r#"
	{
		"type": "record", "name": "proj.V1",
		"fields": [{ "name": "x", "type": "int" }]
	}
	"#
	.parse()?;
	let reader: Schema = r#"
	{
		"type": "record", "name": "proj.V1",
		"fields": [
			{ "name": "x", "type": "int" },
			{ "name": "y", "type": "int", "default": 7 }
		]
	}
	"#
	.parse()?;

	let encoded = avro_reflect::write(
		&HostValue::Record {
			name: "proj.V1".to_owned(),
			fields: vec![HostValue::Int(1)],
		},
		&writer,
	)?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&reader), 0)?;
	assert_eq!(
		decoded,
		Decoded::Host(HostValue::Record {
			name: "proj.V1".to_owned(),
			fields: vec![HostValue::Int(1), HostValue::Int(7)],
		})
	);
	Ok(())
}

#[test]
fn missing_fields_without_defaults_fail() -> anyhow::Result<()> {
	let writer: Schema = r#"
	{
		"type": "record", "name": "proj.V2",
		"fields": [{ "name": "x", "type": "int" }]
	}
	"#
	.parse()?;
	let reader: Schema = r#"
	{
		"type": "record", "name": "proj.V2",
		"fields": [
			{ "name": "x", "type": "int" },
			{ "name": "y", "type": "int" }
		]
	}
	"#
	.parse()?;

	let encoded = avro_reflect::write(
		&HostValue::Record {
			name: "proj.V2".to_owned(),
			fields: vec![HostValue::Int(1)],
		},
		&writer,
	)?;
	let error = avro_reflect::read(&encoded, &writer, Some(&reader), 0).unwrap_err();
	assert!(error.to_string().contains("y"));
	Ok(())
}

#[test]
fn renamed_fields_resolve_through_aliases() -> anyhow::Result<()> {
	let writer: Schema = r#"
	{
		"type": "record", "name": "proj.V3",
		"fields": [{ "name": "old", "type": "string" }]
	}
	"#
	.parse()?;
	let reader: Schema = r#"
	{
		"type": "record", "name": "proj.V3",
		"fields": [{ "name": "new", "type": "string", "aliases": ["old"] }]
	}
	"#
	.parse()?;

	let encoded = avro_reflect::write(
		&HostValue::Record {
			name: "proj.V3".to_owned(),
			fields: vec![HostValue::Str("kept".to_owned())],
		},
		&writer,
	)?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&reader), 0)?;
	assert_eq!(
		decoded,
		Decoded::Host(HostValue::Record {
			name: "proj.V3".to_owned(),
			fields: vec![HostValue::Str("kept".to_owned())],
		})
	);
	Ok(())
}

#[test]
fn ints_promote_to_longs_and_doubles() -> anyhow::Result<()> {
	let writer: Schema = r#""int""#.parse()?;

	let encoded = avro_reflect::write(&HostValue::Int(41), &writer)?;

	let as_long: Schema = r#""long""#.parse()?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&as_long), 0)?;
	assert_eq!(decoded, Decoded::Host(HostValue::Long(41)));

	let as_double: Schema = r#""double""#.parse()?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&as_double), 0)?;
	assert_eq!(decoded, Decoded::Host(HostValue::Double(41.0)));
	Ok(())
}

#[test]
fn enum_symbols_remap_to_the_reader_order() -> anyhow::Result<()> {
	let writer: Schema = r#"
	{ "type": "enum", "name": "proj.Mood", "symbols": ["Up", "Down"] }
	"#
	.parse()?;
	let reader: Schema = r#"
	{ "type": "enum", "name": "proj.Mood", "symbols": ["Down", "Up"] }
	"#
	.parse()?;

	let encoded = avro_reflect::write(
		&HostValue::Enum {
			name: "proj.Mood".to_owned(),
			symbol: "Down".to_owned(),
		},
		&writer,
	)?;
	// Written at position 1 under the writer's symbol order
	assert_eq!(encoded, vec![2]);

	let decoded = avro_reflect::read(&encoded, &writer, None, 0)?;
	assert_eq!(decoded, Decoded::Generic(Value::Enum(1, "Down".to_owned())));

	let decoded = avro_reflect::read(&encoded, &writer, Some(&reader), 0)?;
	assert_eq!(
		decoded,
		Decoded::Host(HostValue::Enum {
			name: "proj.Mood".to_owned(),
			symbol: "Down".to_owned(),
		})
	);
	Ok(())
}

#[test]
fn union_members_rematch_against_the_reader() -> anyhow::Result<()> {
	let writer: Schema = r#"["null", "int"]"#.parse()?;
	let reader: Schema = r#"["long", "null"]"#.parse()?;

	let encoded = avro_reflect::write(&HostValue::Int(9), &writer)?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&reader), 0)?;
	assert_eq!(decoded, Decoded::Host(HostValue::Long(9)));

	let encoded = avro_reflect::write(&HostValue::Null, &writer)?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&reader), 0)?;
	assert_eq!(decoded, Decoded::Host(HostValue::Null));
	Ok(())
}

#[test]
fn writer_strings_resolve_to_reader_bytes() -> anyhow::Result<()> {
	let writer: Schema = r#""string""#.parse()?;
	let reader: Schema = r#""bytes""#.parse()?;

	let encoded = avro_reflect::write(&HostValue::Str("ab".to_owned()), &writer)?;
	let decoded = avro_reflect::read(&encoded, &writer, Some(&reader), 0)?;
	assert_eq!(decoded, Decoded::Host(HostValue::Bytes(vec![b'a', b'b'])));
	Ok(())
}
