//! Wire compatibility against the apache-avro implementation

use {
	apache_avro::types::Value as ApacheValue,
	avro_reflect::{Decoded, Descriptor, FieldDescriptor, HostValue, RecordDescriptor},
	pretty_assertions::assert_eq,
	std::sync::Arc,
};

fn point_descriptor() -> Arc<Descriptor> {
	Arc::new(Descriptor::from(RecordDescriptor::new(
		"interop.Pt",
		vec![
			FieldDescriptor::new(0, "x", Arc::new(Descriptor::Int)),
			FieldDescriptor::new(1, "label", Arc::new(Descriptor::Str)),
		],
	)))
}

#[test]
fn records_encode_byte_identically() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();
	let apache_schema = apache_avro::Schema::parse_str(&schema.json()).unwrap();

	let ours = avro_reflect::write(
		&HostValue::Record {
			name: "interop.Pt".to_owned(),
			fields: vec![HostValue::Int(42), HostValue::Str("here".to_owned())],
		},
		&schema,
	)
	.unwrap();
	let theirs = apache_avro::to_avro_datum(
		&apache_schema,
		ApacheValue::Record(vec![
			("x".to_owned(), ApacheValue::Int(42)),
			("label".to_owned(), ApacheValue::String("here".to_owned())),
		]),
	)
	.unwrap();
	assert_eq!(ours, theirs);
}

#[test]
fn apache_datums_decode_with_this_codec() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();
	let apache_schema = apache_avro::Schema::parse_str(&schema.json()).unwrap();

	let datum = apache_avro::to_avro_datum(
		&apache_schema,
		ApacheValue::Record(vec![
			("x".to_owned(), ApacheValue::Int(-7)),
			("label".to_owned(), ApacheValue::String("peer".to_owned())),
		]),
	)
	.unwrap();

	let decoded = avro_reflect::read(&datum, &schema, Some(&schema), 0).unwrap();
	assert_eq!(
		decoded,
		Decoded::Host(HostValue::Record {
			name: "interop.Pt".to_owned(),
			fields: vec![HostValue::Int(-7), HostValue::Str("peer".to_owned())],
		})
	);
}

#[test]
fn this_codec_decodes_with_apache() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();
	let apache_schema = apache_avro::Schema::parse_str(&schema.json()).unwrap();

	let datum = avro_reflect::write(
		&HostValue::Record {
			name: "interop.Pt".to_owned(),
			fields: vec![HostValue::Int(1), HostValue::Str("x".to_owned())],
		},
		&schema,
	)
	.unwrap();

	let decoded =
		apache_avro::from_avro_datum(&apache_schema, &mut datum.as_slice(), None).unwrap();
	assert_eq!(
		decoded,
		ApacheValue::Record(vec![
			("x".to_owned(), ApacheValue::Int(1)),
			("label".to_owned(), ApacheValue::String("x".to_owned())),
		])
	);
}

#[test]
fn arrays_encode_byte_identically() {
	let apache_schema =
		apache_avro::Schema::parse_str(r#"{ "type": "array", "items": "long" }"#).unwrap();
	let schema: avro_reflect::Schema =
		r#"{ "type": "array", "items": "long" }"#.parse().unwrap();

	let ours = avro_reflect::write(
		&HostValue::Sequence(
			avro_reflect::ContainerShape::List,
			vec![HostValue::Long(1), HostValue::Long(3), HostValue::Long(2)],
		),
		&schema,
	)
	.unwrap();
	let theirs = apache_avro::to_avro_datum(
		&apache_schema,
		ApacheValue::Array(vec![
			ApacheValue::Long(1),
			ApacheValue::Long(3),
			ApacheValue::Long(2),
		]),
	)
	.unwrap();
	assert_eq!(ours, theirs);
}
