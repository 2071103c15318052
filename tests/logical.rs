use {
	avro_reflect::{
		Decoded, Descriptor, FieldDescriptor, FixedHint, HostValue, NewtypeDescriptor,
		RecordDescriptor, Schema,
	},
	pretty_assertions::assert_eq,
	serde_json::json,
	std::sync::Arc,
	uuid::Uuid,
};

#[test]
fn uuids_are_sixteen_big_endian_bytes() {
	let descriptor = Arc::new(Descriptor::Uuid);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();
	assert_eq!(
		schema.json().parse::<serde_json::Value>().unwrap(),
		json!({ "type": "fixed", "name": "UUID", "size": 16, "logicalType": "uuid" })
	);

	let uuid = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
	let encoded = avro_reflect::write(&HostValue::Uuid(uuid), &schema).unwrap();
	let mut expected = [0u8; 16];
	expected[15] = 1;
	assert_eq!(encoded, expected);

	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(HostValue::Uuid(uuid)));
}

#[test]
fn fixed_strings_pad_and_trim_trailing_zeros() {
	let descriptor = Arc::new(Descriptor::from(RecordDescriptor::new(
		"fx.Key",
		vec![FieldDescriptor::new(0, "key", Arc::new(Descriptor::Str))
			.with_fixed(FixedHint::sized(8))],
	)));
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let value = HostValue::Record {
		name: "fx.Key".to_owned(),
		fields: vec![HostValue::Str("abc".to_owned())],
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	assert_eq!(encoded, vec![b'a', b'b', b'c', 0, 0, 0, 0, 0]);

	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}

#[test]
fn fixed_integers_are_big_endian() {
	let descriptor = Arc::new(Descriptor::from(RecordDescriptor::new(
		"fx.Counters",
		vec![
			FieldDescriptor::new(0, "small", Arc::new(Descriptor::Int))
				.with_fixed(FixedHint::default()),
			FieldDescriptor::new(1, "large", Arc::new(Descriptor::Long))
				.with_fixed(FixedHint::default()),
		],
	)));
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let value = HostValue::Record {
		name: "fx.Counters".to_owned(),
		fields: vec![HostValue::Int(1), HostValue::Long(2)],
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	assert_eq!(
		encoded,
		vec![0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2]
	);

	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}

#[test]
fn newtypes_round_trip_when_registered() {
	let email = Arc::new(Descriptor::from(NewtypeDescriptor::new(
		"mail.Email",
		Arc::new(Descriptor::Str),
	)));
	avro_reflect::register(&email);
	let schema = avro_reflect::infer_schema(&email).unwrap();
	assert_eq!(
		schema.json().parse::<serde_json::Value>().unwrap(),
		json!({ "type": "string", "logicalType": "mail.Email" })
	);

	let value = HostValue::Newtype {
		name: "mail.Email".to_owned(),
		value: Box::new(HostValue::Str("a@b.c".to_owned())),
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	// On the wire it is a plain string
	assert_eq!(encoded, vec![10, b'a', b'@', b'b', b'.', b'c']);

	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}

#[test]
fn unresolvable_newtypes_decode_to_the_underlying_value() {
	// A peer that never registered the wrapper type reads the raw string
	let schema: Schema = r#"{ "type": "string", "logicalType": "mail.Unheard" }"#
		.parse()
		.unwrap();
	let encoded =
		avro_reflect::write(&HostValue::Str("kept".to_owned()), &schema).unwrap();
	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(HostValue::Str("kept".to_owned())));
}

#[test]
fn unknown_fixed_tags_keep_the_raw_bytes() {
	let schema: Schema =
		r#"{ "type": "fixed", "name": "Blob", "size": 4, "logicalType": "fx.Blob" }"#
			.parse()
			.unwrap();
	let encoded =
		avro_reflect::write(&HostValue::Bytes(vec![1, 2, 3, 4]), &schema).unwrap();
	assert_eq!(encoded, vec![1, 2, 3, 4]);
	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(HostValue::Bytes(vec![1, 2, 3, 4])));
}

#[test]
fn newtype_wrapped_longs_round_trip() {
	let counter = Arc::new(Descriptor::from(NewtypeDescriptor::new(
		"metrics.Counter",
		Arc::new(Descriptor::Long),
	)));
	avro_reflect::register(&counter);
	let schema = avro_reflect::infer_schema(&counter).unwrap();

	let value = HostValue::Newtype {
		name: "metrics.Counter".to_owned(),
		value: Box::new(HostValue::Long(21)),
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	assert_eq!(encoded, vec![42]);
	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}
