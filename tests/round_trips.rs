use {
	avro_reflect::{
		ContainerShape, Decoded, Descriptor, FieldDescriptor, HostValue, RecordDescriptor,
		SequenceDescriptor, Value,
	},
	lazy_static::lazy_static,
	pretty_assertions::assert_eq,
	std::{collections::BTreeMap, sync::Arc},
};

lazy_static! {
	static ref POINT: Arc<Descriptor> = Arc::new(Descriptor::from(RecordDescriptor::new(
		"geo.Pt",
		vec![
			FieldDescriptor::new(0, "x", Arc::new(Descriptor::Int)),
			FieldDescriptor::new(1, "y", Arc::new(Descriptor::Int)),
		],
	)));
}

fn point_descriptor() -> Arc<Descriptor> {
	POINT.clone()
}

#[test]
fn record_round_trip() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let value = HostValue::Record {
		name: "geo.Pt".to_owned(),
		fields: vec![HostValue::Int(1), HostValue::Int(2)],
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	assert_eq!(encoded, vec![2, 4]);

	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}

#[test]
fn read_without_reader_schema_stays_generic() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let value = HostValue::Record {
		name: "geo.Pt".to_owned(),
		fields: vec![HostValue::Int(-1), HostValue::Int(0)],
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	assert_eq!(encoded, vec![1, 0]);

	let decoded = avro_reflect::read(&encoded, &schema, None, 0).unwrap();
	assert_eq!(
		decoded,
		Decoded::Generic(Value::Record(vec![
			("x".to_owned(), Value::Int(-1)),
			("y".to_owned(), Value::Int(0)),
		]))
	);
}

#[test]
fn read_honors_the_offset() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let value = HostValue::Record {
		name: "geo.Pt".to_owned(),
		fields: vec![HostValue::Int(3), HostValue::Int(4)],
	};
	let mut framed = vec![0xde, 0xad];
	framed.extend(avro_reflect::write(&value, &schema).unwrap());

	let decoded = avro_reflect::read(&framed, &schema, Some(&schema), 2).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}

#[test]
fn streams_are_flushed_but_not_consumed_past_the_datum() {
	let descriptor = point_descriptor();
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let value = HostValue::Record {
		name: "geo.Pt".to_owned(),
		fields: vec![HostValue::Int(5), HostValue::Int(6)],
	};
	let mut sink = Vec::new();
	avro_reflect::write_to(&value, &schema, &mut sink).unwrap();
	assert_eq!(sink, vec![10, 12]);

	// Trailing bytes after the datum belong to the caller
	sink.extend([0xff, 0xff]);
	let mut stream: &[u8] = &sink;
	let decoded = avro_reflect::read_from(&mut stream, &schema, Some(&schema)).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
	assert_eq!(stream, &[0xff, 0xff]);
}

#[test]
fn typed_primitives_round_trip() {
	let encoded = avro_reflect::to_bytes(&3i64).unwrap();
	assert_eq!(encoded, vec![6]);
	assert_eq!(avro_reflect::from_bytes::<i64>(&encoded).unwrap(), 3);

	let encoded = avro_reflect::to_bytes(&"foo".to_owned()).unwrap();
	assert_eq!(encoded, vec![6, 102, 111, 111]);
	assert_eq!(avro_reflect::from_bytes::<String>(&encoded).unwrap(), "foo");

	let encoded = avro_reflect::to_bytes(&true).unwrap();
	assert_eq!(encoded, vec![1]);
	assert!(avro_reflect::from_bytes::<bool>(&encoded).unwrap());

	let encoded = avro_reflect::to_bytes(&1234.5f64).unwrap();
	assert_eq!(avro_reflect::from_bytes::<f64>(&encoded).unwrap(), 1234.5);
}

#[test]
fn typed_collections_round_trip() {
	let items = vec![1i64, 3, 2];
	let encoded = avro_reflect::to_bytes(&items).unwrap();
	assert_eq!(encoded, vec![6, 2, 6, 4, 0]);
	assert_eq!(
		avro_reflect::from_bytes::<Vec<i64>>(&encoded).unwrap(),
		items
	);

	let entries: BTreeMap<String, i64> = [("a".to_owned(), 1i64), ("b".to_owned(), 2)]
		.into_iter()
		.collect();
	let encoded = avro_reflect::to_bytes(&entries).unwrap();
	assert_eq!(
		avro_reflect::from_bytes::<BTreeMap<String, i64>>(&encoded).unwrap(),
		entries
	);
}

#[test]
fn typed_options_round_trip() {
	let encoded = avro_reflect::to_bytes(&Some("x".to_owned())).unwrap();
	assert_eq!(encoded, vec![2, 2, b'x']);
	assert_eq!(
		avro_reflect::from_bytes::<Option<String>>(&encoded).unwrap(),
		Some("x".to_owned())
	);

	let encoded = avro_reflect::to_bytes(&None::<String>).unwrap();
	assert_eq!(encoded, vec![0]);
	assert_eq!(
		avro_reflect::from_bytes::<Option<String>>(&encoded).unwrap(),
		None
	);
}

#[test]
fn sets_deduplicate_on_read() {
	let descriptor = Arc::new(Descriptor::from(RecordDescriptor::new(
		"col.Tags",
		vec![FieldDescriptor::new(
			0,
			"tags",
			Arc::new(Descriptor::Sequence(SequenceDescriptor::new(
				ContainerShape::Set,
				Arc::new(Descriptor::Long),
			))),
		)],
	)));
	avro_reflect::register(&descriptor);
	let schema = avro_reflect::infer_schema(&descriptor).unwrap();

	let written = HostValue::Record {
		name: "col.Tags".to_owned(),
		fields: vec![HostValue::Sequence(
			ContainerShape::Set,
			vec![HostValue::Long(1), HostValue::Long(2), HostValue::Long(1)],
		)],
	};
	let encoded = avro_reflect::write(&written, &schema).unwrap();
	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(
		decoded,
		Decoded::Host(HostValue::Record {
			name: "col.Tags".to_owned(),
			fields: vec![HostValue::Sequence(
				ContainerShape::Set,
				vec![HostValue::Long(1), HostValue::Long(2)],
			)],
		})
	);
}

#[test]
fn nested_records_round_trip() {
	let segment = Arc::new(Descriptor::from(RecordDescriptor::new(
		"geo.Segment",
		vec![
			FieldDescriptor::new(0, "from", point_descriptor()),
			FieldDescriptor::new(1, "to", point_descriptor()),
		],
	)));
	avro_reflect::register(&segment);
	let schema = avro_reflect::infer_schema(&segment).unwrap();

	let point = |x, y| HostValue::Record {
		name: "geo.Pt".to_owned(),
		fields: vec![HostValue::Int(x), HostValue::Int(y)],
	};
	let value = HostValue::Record {
		name: "geo.Segment".to_owned(),
		fields: vec![point(1, 2), point(3, 4)],
	};
	let encoded = avro_reflect::write(&value, &schema).unwrap();
	assert_eq!(encoded, vec![2, 4, 6, 8]);
	let decoded = avro_reflect::read(&encoded, &schema, Some(&schema), 0).unwrap();
	assert_eq!(decoded, Decoded::Host(value));
}
